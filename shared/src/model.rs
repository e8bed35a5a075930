use serde::{Deserialize, Serialize};
use std::fmt;

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }
    };
}

typed_id!(EmployeeId);
typed_id!(ImageId);
typed_id!(ValentineId);
typed_id!(UserId);

// --- Remote records ---

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl Employee {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValentineImage {
    pub id: ImageId,
    pub image: String,
    #[serde(default)]
    pub owner: Option<UserId>,
}

/// Card as stored by the backend. The wire field names differ from ours.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Valentine {
    pub id: ValentineId,
    #[serde(rename = "sender")]
    pub sender_id: EmployeeId,
    #[serde(rename = "recipient")]
    pub recipient_id: EmployeeId,
    #[serde(rename = "image")]
    pub image_id: ImageId,
    pub text: String,
    #[serde(rename = "is_anonymously", default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub anonymous_signature: String,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub is_read_by_recipient: bool,
}

impl Valentine {
    /// Line shown under a sent card.
    #[must_use]
    pub fn signature_line(&self) -> String {
        sender_line(self.is_anonymous, &self.anonymous_signature)
    }
}

/// Who a card is from, worded the same on the check step and in the sent list.
#[must_use]
pub fn sender_line(is_anonymous: bool, signature: &str) -> String {
    if is_anonymous {
        format!("анонимно от {signature}")
    } else {
        "от Вашего имени".to_string()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateValentineRequest {
    pub recipient: EmployeeId,
    pub image: ImageId,
    pub text: String,
    pub is_anonymously: bool,
    pub anonymous_signature: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReceivedValentines {
    pub is_up_time: bool,
    #[serde(default)]
    pub valentines: Vec<Valentine>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenGrant {
    pub token: String,
    pub employee_id: EmployeeId,
    pub user_id: UserId,
}

/// File picked in the shell, ready for multipart upload.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    #[serde(with = "serde_bytes")]
    pub bytes: Vec<u8>,
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}
