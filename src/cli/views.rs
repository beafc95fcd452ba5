//! Table rendering, search and confirmation for the terminal client.
//!
//! Every command re-fetches the full list and renders it from scratch; nothing
//! is cached between invocations.

use std::io::{self, BufRead, Write};

use crate::database::models::{Course, Entity, Student};

/// How a record type shows up in the client.
pub trait TableView: Entity {
    const HEADERS: &'static [&'static str];
    const EMPTY_MESSAGE: &'static str;
    /// Singular noun used in prompts ("o aluno", "o curso").
    const NOUN: &'static str;

    fn cells(&self) -> Vec<String>;

    /// `term` is already lowercased and trimmed.
    fn matches(&self, term: &str) -> bool;
}

impl TableView for Student {
    const HEADERS: &'static [&'static str] = &["ID", "Nome", "Apelido", "Curso", "Ano"];
    const EMPTY_MESSAGE: &'static str = "Nenhum aluno cadastrado.";
    const NOUN: &'static str = "o aluno";

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.nome.clone(),
            self.apelido.clone(),
            self.curso.clone(),
            self.ano_curricular.clone(),
        ]
    }

    fn matches(&self, term: &str) -> bool {
        contains(&self.nome, term)
            || contains(&self.apelido, term)
            || contains(&self.curso, term)
            || self.id.to_string().contains(term)
    }
}

impl TableView for Course {
    const HEADERS: &'static [&'static str] = &["ID", "Nome", "Sigla"];
    const EMPTY_MESSAGE: &'static str = "Nenhum curso cadastrado.";
    const NOUN: &'static str = "o curso";

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.nome.clone(), self.sigla.clone()]
    }

    fn matches(&self, term: &str) -> bool {
        contains(&self.nome, term) || contains(&self.sigla, term) || self.id.to_string().contains(term)
    }
}

fn contains(field: &str, term: &str) -> bool {
    field.to_lowercase().contains(term)
}

/// Lowercased, trimmed search term, or `None` when it is too short to filter on.
pub fn normalize_term(raw: &str) -> Option<String> {
    let term = raw.trim().to_lowercase();
    (term.chars().count() >= 2).then_some(term)
}

pub fn filter_records<'a, T: TableView>(records: &'a [T], search: Option<&str>) -> Vec<&'a T> {
    match search.and_then(normalize_term) {
        Some(term) => records.iter().filter(|r| r.matches(&term)).collect(),
        None => records.iter().collect(),
    }
}

/// Filtered table; a search that hides every existing record says so instead
/// of claiming the collection is empty.
pub fn render_listing<T: TableView>(records: &[T], search: Option<&str>) -> String {
    let visible = filter_records(records, search);
    match (visible.is_empty(), records.is_empty(), search.and_then(normalize_term)) {
        (true, false, Some(term)) => format!("Nenhum resultado encontrado para \"{}\".\n", term),
        _ => render_table(&visible),
    }
}

pub fn render_table<T: TableView>(records: &[&T]) -> String {
    if records.is_empty() {
        return format!("{}\n", T::EMPTY_MESSAGE);
    }

    let rows: Vec<Vec<String>> = records.iter().map(|r| r.cells()).collect();
    let mut widths: Vec<usize> = T::HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let headers: Vec<String> = T::HEADERS.iter().map(|h| h.to_string()).collect();
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

    let mut out = String::new();
    out.push_str(&line(&headers));
    out.push('\n');
    out.push_str(&line(&separator));
    out.push('\n');
    for row in &rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

/// Ask a yes/no question; only `s`/`sim` (any case) counts as yes.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> io::Result<bool> {
    write!(output, "{} [s/N] ", question)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "s" | "sim"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn students() -> Vec<Student> {
        vec![
            Student {
                id: 1,
                nome: "Ana".into(),
                apelido: "Silva".into(),
                curso: "Informática".into(),
                ano_curricular: "2".into(),
            },
            Student {
                id: 12,
                nome: "Bruno".into(),
                apelido: "Costa".into(),
                curso: "Gestão".into(),
                ano_curricular: "1".into(),
            },
        ]
    }

    #[test]
    fn short_terms_do_not_filter() {
        let all = students();
        assert_eq!(filter_records(&all, Some("a")).len(), 2);
        assert_eq!(filter_records(&all, Some("   ")).len(), 2);
        assert_eq!(filter_records(&all, None).len(), 2);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let all = students();
        let by_name: Vec<i64> = filter_records(&all, Some("  SILVA ")).iter().map(|s| s.id).collect();
        assert_eq!(by_name, vec![1]);

        let by_course: Vec<i64> = filter_records(&all, Some("gest")).iter().map(|s| s.id).collect();
        assert_eq!(by_course, vec![12]);

        let by_id: Vec<i64> = filter_records(&all, Some("12")).iter().map(|s| s.id).collect();
        assert_eq!(by_id, vec![12]);
    }

    #[test]
    fn courses_match_on_sigla() {
        let courses = vec![
            Course { id: 1, nome: "Engenharia Informática".into(), sigla: "EI".into() },
            Course { id: 2, nome: "Gestão".into(), sigla: "GES".into() },
        ];
        let found = filter_records(&courses, Some("ges"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);
    }

    #[test]
    fn tables_are_rendered_with_aligned_columns() {
        let courses = vec![Course { id: 7, nome: "Gestão".into(), sigla: "GES".into() }];
        let refs: Vec<&Course> = courses.iter().collect();
        let table = render_table(&refs);

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "ID  Nome    Sigla");
        assert_eq!(lines[1], "--  ------  -----");
        assert_eq!(lines[2], "7   Gestão  GES");
    }

    #[test]
    fn empty_lists_print_the_empty_message() {
        assert_eq!(render_table::<Student>(&[]), "Nenhum aluno cadastrado.\n");
    }

    #[test]
    fn searches_without_hits_are_not_reported_as_empty() {
        let all = students();
        assert_eq!(render_listing(&all, Some("Zeca")), "Nenhum resultado encontrado para \"zeca\".\n");
        assert_eq!(render_listing::<Student>(&[], Some("Zeca")), "Nenhum aluno cadastrado.\n");
        assert!(render_listing(&all, Some("ana")).contains("Silva"));
    }

    #[test]
    fn only_explicit_yes_confirms() {
        let mut out = Vec::new();
        assert!(confirm(&mut Cursor::new("s\n"), &mut out, "Apagar?").unwrap());
        assert!(confirm(&mut Cursor::new("SIM\n"), &mut out, "Apagar?").unwrap());
        assert!(!confirm(&mut Cursor::new("\n"), &mut out, "Apagar?").unwrap());
        assert!(!confirm(&mut Cursor::new("yes\n"), &mut out, "Apagar?").unwrap());
        assert!(String::from_utf8(out).unwrap().starts_with("Apagar? [s/N] "));
    }
}
