use crate::error::CatalogError;
use common::model::backup::BackupRecord;
use common::model::course::{Course, CourseDraft, CourseId};

/// Maps stored courses to backup entries. Every entry carries its id as text.
pub fn encode(courses: &[Course]) -> Vec<BackupRecord> {
    courses
        .iter()
        .map(|course| BackupRecord {
            id: Some(course.id.to_string()),
            title: course.title.clone(),
            duration: course.duration.clone(),
            price: course.price.clone(),
            image: course.image.clone(),
        })
        .collect()
}

/// Maps backup entries back to insertable drafts.
///
/// Entries without `_id` become new courses; the first entry whose `_id` does
/// not parse fails the whole batch.
pub fn decode(entries: Vec<BackupRecord>) -> Result<Vec<CourseDraft>, CatalogError> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| -> Result<CourseDraft, CatalogError> {
            let id = match entry.id {
                Some(text) => Some(
                    text.parse::<CourseId>()
                        .map_err(|_| CatalogError::MalformedIdentifier { index, value: text })?,
                ),
                None => None,
            };
            Ok(CourseDraft {
                id,
                title: entry.title,
                duration: entry.duration,
                price: entry.price,
                image: entry.image,
            })
        })
        .collect()
}

pub fn to_pretty_json(entries: &[BackupRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(entries)
}

pub fn from_json(text: &str) -> Result<Vec<BackupRecord>, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(title: &str, image: Option<&str>) -> Course {
        Course {
            id: CourseId::generate(),
            title: title.into(),
            duration: "12 horas".into(),
            price: "30 €".into(),
            image: image.map(str::to_string),
        }
    }

    #[test]
    fn decode_inverts_encode() {
        let courses = vec![course("Docker", Some("1_docker.png")), course("Ruby", None)];
        let drafts = decode(encode(&courses)).unwrap();
        let expected: Vec<CourseDraft> = courses.into_iter().map(CourseDraft::from).collect();
        assert_eq!(drafts, expected);
    }

    #[test]
    fn encode_writes_canonical_text_ids() {
        let c = course("Git", None);
        let entries = encode(std::slice::from_ref(&c));
        assert_eq!(entries[0].id.as_deref(), Some(c.id.to_string().as_str()));
    }

    #[test]
    fn entries_without_id_become_new_courses() {
        let entries = from_json(r#"[{"titulo":"Nuevo","duracion":"1h","precio":"0","imagen":null}]"#)
            .unwrap();
        let drafts = decode(entries).unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].id, None);
        assert_eq!(drafts[0].title, "Nuevo");
    }

    #[test]
    fn malformed_id_fails_with_its_index() {
        let mut entries = encode(&[course("A", None), course("B", None), course("C", None)]);
        entries[1].id = Some("65a1f0c2e4b0".into());
        match decode(entries) {
            Err(CatalogError::MalformedIdentifier { index, value }) => {
                assert_eq!(index, 1);
                assert_eq!(value, "65a1f0c2e4b0");
            }
            other => panic!("expected MalformedIdentifier, got {:?}", other),
        }
    }

    #[test]
    fn pretty_json_is_indented_array() {
        let json = to_pretty_json(&encode(&[course("Mongo", None)])).unwrap();
        assert!(json.starts_with("[\n  {\n    \"_id\": "));
        assert!(json.contains("\"imagen\": null"));
        assert_eq!(from_json(&json).unwrap().len(), 1);
    }
}
