use serde::{Deserialize, Serialize};

use super::Entity;

/// `Aluno` record. Field names on the wire keep the original Portuguese keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    #[serde(rename = "Nome")]
    pub nome: String,
    #[serde(rename = "Apelido")]
    pub apelido: String,
    /// Free-text course label, not a reference to `Course::id`.
    #[serde(rename = "Curso")]
    pub curso: String,
    #[serde(rename = "Ano_Curricular")]
    pub ano_curricular: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentPatch {
    #[serde(rename = "Nome", default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(rename = "Apelido", default, skip_serializing_if = "Option::is_none")]
    pub apelido: Option<String>,
    #[serde(rename = "Curso", default, skip_serializing_if = "Option::is_none")]
    pub curso: Option<String>,
    #[serde(rename = "Ano_Curricular", default, skip_serializing_if = "Option::is_none")]
    pub ano_curricular: Option<String>,
}

impl Entity for Student {
    type Patch = StudentPatch;

    const COLLECTION: &'static str = "alunos";
    const LABEL: &'static str = "Aluno";
    const FIELDS: &'static [&'static str] = &["Nome", "Apelido", "Curso", "Ano_Curricular"];

    fn id(&self) -> i64 {
        self.id
    }

    fn apply(&mut self, patch: StudentPatch) {
        if let Some(nome) = patch.nome {
            self.nome = nome;
        }
        if let Some(apelido) = patch.apelido {
            self.apelido = apelido;
        }
        if let Some(curso) = patch.curso {
            self.curso = curso;
        }
        if let Some(ano_curricular) = patch.ano_curricular {
            self.ano_curricular = ano_curricular;
        }
    }
}
