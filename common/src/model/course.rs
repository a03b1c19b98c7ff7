use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// The store's native identifier for a course.
///
/// Laid out like a BSON ObjectId: 4 bytes of big-endian seconds since the epoch,
/// 5 random bytes fixed per process, and a 3-byte counter. The text form is 24
/// lowercase hex digits, so backups written by the MongoDB version of the
/// catalog keep their ids. The store persists the raw 12 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CourseId([u8; 12]);

struct Generator {
    process: [u8; 5],
    counter: AtomicU32,
}

fn generator() -> &'static Generator {
    static GENERATOR: OnceLock<Generator> = OnceLock::new();
    GENERATOR.get_or_init(|| {
        let seed = Uuid::new_v4().into_bytes();
        Generator {
            process: [seed[0], seed[1], seed[2], seed[3], seed[4]],
            counter: AtomicU32::new(u32::from_be_bytes([0, seed[5], seed[6], seed[7]])),
        }
    })
}

impl CourseId {
    /// A fresh identifier, unique within this process and practically unique across processes.
    pub fn generate() -> Self {
        let generator = generator();
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or_default();
        let count = generator.counter.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&generator.process);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        CourseId(bytes)
    }

    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        CourseId(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 12] {
        &self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Returned when a piece of text is not a valid course identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not a valid course identifier")]
pub struct InvalidCourseId(pub String);

impl FromStr for CourseId {
    type Err = InvalidCourseId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidCourseId(s.to_string());
        let hex = s.trim().as_bytes();
        if hex.len() != 24 || !hex.iter().all(u8::is_ascii_hexdigit) {
            return Err(invalid());
        }
        let mut bytes = [0u8; 12];
        for (byte, pair) in bytes.iter_mut().zip(hex.chunks_exact(2)) {
            let pair = std::str::from_utf8(pair).map_err(|_| invalid())?;
            *byte = u8::from_str_radix(pair, 16).map_err(|_| invalid())?;
        }
        Ok(CourseId(bytes))
    }
}

impl From<CourseId> for String {
    fn from(id: CourseId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for CourseId {
    type Error = InvalidCourseId;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

/// A course as it lives in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub duration: String,
    /// Free text, e.g. "49,99 €". Never parsed as a number.
    pub price: String,
    /// File name inside the uploads directory.
    pub image: Option<String>,
}

/// A course waiting to be inserted.
///
/// `id` is `None` for brand new courses; the store picks one on insert.
/// Restored courses keep the identifier they had in the backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDraft {
    pub id: Option<CourseId>,
    pub title: String,
    pub duration: String,
    pub price: String,
    pub image: Option<String>,
}

impl CourseDraft {
    pub fn new(title: String, duration: String, price: String, image: Option<String>) -> Self {
        CourseDraft {
            id: None,
            title,
            duration,
            price,
            image,
        }
    }

    /// Turns the draft into a stored course under the given id.
    pub fn into_course(self, id: CourseId) -> Course {
        Course {
            id,
            title: self.title,
            duration: self.duration,
            price: self.price,
            image: self.image,
        }
    }
}

impl From<Course> for CourseDraft {
    fn from(course: Course) -> Self {
        CourseDraft {
            id: Some(course.id),
            title: course.title,
            duration: course.duration,
            price: course.price,
            image: course.image,
        }
    }
}

/// Field changes applied to an existing course.
///
/// `image: None` keeps whatever image the course already has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseUpdate {
    pub title: String,
    pub duration: String,
    pub price: String,
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_form_round_trips() {
        let id = CourseId::generate();
        let parsed: CourseId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn reads_mongodb_object_ids() {
        let id: CourseId = "65A1F0C2E4B0A1B2C3D4E5F6".parse().unwrap();
        assert_eq!(id.to_string(), "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(id.as_bytes()[0], 0x65);
    }

    #[test]
    fn rejects_garbage() {
        let err = "not-an-id".parse::<CourseId>().unwrap_err();
        assert_eq!(err, InvalidCourseId("not-an-id".to_string()));
        assert_eq!(err.to_string(), "'not-an-id' is not a valid course identifier");
        assert!("".parse::<CourseId>().is_err());
        assert!("65a1f0c2e4b0a1b2c3d4e5fz".parse::<CourseId>().is_err());
        assert!("6f9619ff-8b86-d011-b42d-00c04fc964ff".parse::<CourseId>().is_err());
        assert!("+5a1f0c2e4b0a1b2c3d4e5f6".parse::<CourseId>().is_err());
    }

    #[test]
    fn generated_ids_are_distinct_and_start_with_the_clock() {
        let a = CourseId::generate();
        let b = CourseId::generate();
        assert_ne!(a, b);
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as u32;
        let stamp = u32::from_be_bytes(a.as_bytes()[..4].try_into().unwrap());
        assert!(now.abs_diff(stamp) <= 1);
    }

    #[test]
    fn serializes_as_hex_text() {
        let id: CourseId = "65a1f0c2e4b0a1b2c3d4e5f6".parse().unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"65a1f0c2e4b0a1b2c3d4e5f6\"");
        let back: CourseId = serde_json::from_str("\"65a1f0c2e4b0a1b2c3d4e5f6\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn bytes_round_trip() {
        let id = CourseId::generate();
        assert_eq!(CourseId::from_bytes(*id.as_bytes()), id);
    }

    #[test]
    fn draft_from_course_keeps_id() {
        let id = CourseId::generate();
        let course = CourseDraft::new("Rust".into(), "10h".into(), "20".into(), None).into_course(id);
        let draft = CourseDraft::from(course);
        assert_eq!(draft.id, Some(id));
        assert_eq!(draft.title, "Rust");
    }
}
