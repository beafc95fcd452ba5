use serde::{Deserialize, Serialize};

use super::Entity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    #[serde(rename = "Nome")]
    pub nome: String,
    #[serde(rename = "Sigla")]
    pub sigla: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoursePatch {
    #[serde(rename = "Nome", default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(rename = "Sigla", default, skip_serializing_if = "Option::is_none")]
    pub sigla: Option<String>,
}

impl Entity for Course {
    type Patch = CoursePatch;

    const COLLECTION: &'static str = "cursos";
    const LABEL: &'static str = "Curso";
    const FIELDS: &'static [&'static str] = &["Nome", "Sigla"];

    fn id(&self) -> i64 {
        self.id
    }

    fn apply(&mut self, patch: CoursePatch) {
        if let Some(nome) = patch.nome {
            self.nome = nome;
        }
        if let Some(sigla) = patch.sigla {
            self.sigla = sigla;
        }
    }
}
