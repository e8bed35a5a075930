use serde::{Deserialize, Serialize};

use crate::bottom_bar::BottomBarView;
use crate::model::{EmployeeId, ImageId, ValentineId};
use crate::router::TransitionState;
use crate::{AppError, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    LoadHeart,
    Heart,
    Upload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyMode {
    #[default]
    Public,
    Anonymous,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmployeeCard {
    pub id: EmployeeId,
    pub full_name: String,
    pub position: String,
    pub avatar: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Slide {
    Image { id: ImageId, url: String },
    Upload,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilePreview {
    pub file_name: String,
    pub mime_type: String,
    pub size: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SentItem {
    pub id: ValentineId,
    pub recipient_name: String,
    pub recipient_avatar: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SentCard {
    pub id: ValentineId,
    pub text: String,
    pub image_url: Option<String>,
    pub recipient_name: String,
    pub signature_line: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReceivedCard {
    pub id: ValentineId,
    pub sender_name: String,
    pub avatar: String,
    pub text: String,
    pub image_url: Option<String>,
    pub is_anonymous: bool,
    pub is_read: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReceivedState {
    Loading,
    /// Cards are hidden until the holiday.
    Wait,
    Empty,
    Cards { cards: Vec<ReceivedCard> },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum ScreenView {
    Blank,
    Preload,
    Main {
        employee_name: Option<String>,
    },
    About,
    Error {
        message: String,
        show_close_button: bool,
    },
    ChoseEmployee {
        employees: Vec<EmployeeCard>,
        selected: Option<EmployeeId>,
    },
    ChoseImage {
        slides: Vec<Slide>,
        active: usize,
        preview: Option<FilePreview>,
        error: Option<String>,
    },
    WriteText {
        text: String,
        min_len: usize,
        is_valid: bool,
    },
    SendingPrivacy {
        mode: PrivacyMode,
        signature: String,
        min_len: usize,
        is_valid: bool,
    },
    Check {
        recipient: Option<EmployeeCard>,
        image_url: Option<String>,
        text: String,
        sender_line: String,
        error: Option<String>,
    },
    MyValentines {
        items: Vec<SentItem>,
        empty_message: Option<String>,
    },
    MyValentineDetail {
        card: Option<SentCard>,
    },
    MyValentineDelete {
        card: Option<SentCard>,
        error: Option<String>,
    },
    Received {
        state: ReceivedState,
        error: Option<String>,
    },
    ReceivedDetail {
        card: Option<ReceivedCard>,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserFacingError {
    pub message: String,
    pub error_code: String,
    pub is_transient: bool,
}

impl From<&AppError> for UserFacingError {
    fn from(e: &AppError) -> Self {
        Self {
            message: e.user_facing_message(),
            error_code: e.code().to_string(),
            is_transient: matches!(e.kind, ErrorKind::Network | ErrorKind::Internal),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewModel {
    pub route: Option<String>,
    pub transition: TransitionState,
    pub fade_ms: u64,
    pub screen: ScreenView,
    pub bottom_bar: BottomBarView,
    pub error: Option<UserFacingError>,
}
