use serde::{Deserialize, Serialize};

use crate::capabilities::HttpResult;
use crate::config::AppConfig;
use crate::model::{EmployeeId, UploadFile, ValentineId};
use crate::pending::OpId;
use crate::screens::ScreenInput;
use crate::view::PrivacyMode;

/// Collections fetched during start-up; `Received` is also reloaded by its list screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadSource {
    Employees,
    Images,
    MyValentines,
    Received,
}

impl LoadSource {
    pub const ALL: [LoadSource; 4] = [
        LoadSource::Employees,
        LoadSource::Images,
        LoadSource::MyValentines,
        LoadSource::Received,
    ];
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // --- Shell ---
    Start {
        config: Option<AppConfig>,
        telegram_user_id: Option<String>,
    },
    /// Any element flagged for navigation, whatever screen owns it.
    NavigationTriggered {
        route: String,
    },
    BackRequested,
    BottomBarClicked,
    ErrorDismissed,

    // --- Screen input ---
    EmployeeToggled {
        id: EmployeeId,
    },
    CarouselMoved {
        index: usize,
    },
    CarouselNext,
    CarouselPrev,
    FileChosen {
        file: UploadFile,
    },
    FileRemoved,
    TextChanged {
        text: String,
    },
    PrivacyModeChanged {
        mode: PrivacyMode,
    },
    SignatureChanged {
        signature: String,
    },
    ValentineSelected {
        id: ValentineId,
    },
    DeleteRequested {
        id: ValentineId,
    },

    // --- Internal ---
    #[serde(skip)]
    TokenReceived {
        telegram_user_id: String,
        result: Box<HttpResult>,
    },
    #[serde(skip)]
    CollectionLoaded {
        source: LoadSource,
        result: Box<HttpResult>,
    },
    #[serde(skip)]
    ImageUploaded {
        op: OpId,
        result: Box<HttpResult>,
    },
    #[serde(skip)]
    ValentineCreated {
        op: OpId,
        result: Box<HttpResult>,
    },
    #[serde(skip)]
    ValentineDeleted {
        op: OpId,
        id: ValentineId,
        result: Box<HttpResult>,
    },
    #[serde(skip)]
    MarkedRead {
        id: ValentineId,
        result: Box<HttpResult>,
    },
    #[serde(skip)]
    MinDisplayElapsed {
        op: OpId,
    },
    #[serde(skip)]
    FadeElapsed {
        seq: u64,
    },
}

impl Event {
    /// The screen-level input this event carries, if any.
    #[must_use]
    pub fn screen_input(&self) -> Option<ScreenInput> {
        let input = match self {
            Event::EmployeeToggled { id } => ScreenInput::EmployeeToggled(*id),
            Event::CarouselMoved { index } => ScreenInput::CarouselMoved { index: *index },
            Event::CarouselNext => ScreenInput::CarouselNext,
            Event::CarouselPrev => ScreenInput::CarouselPrev,
            Event::FileChosen { file } => ScreenInput::FileChosen(file.clone()),
            Event::FileRemoved => ScreenInput::FileRemoved,
            Event::TextChanged { text } => ScreenInput::TextChanged(text.clone()),
            Event::PrivacyModeChanged { mode } => ScreenInput::PrivacyModeChanged(*mode),
            Event::SignatureChanged { signature } => {
                ScreenInput::SignatureChanged(signature.clone())
            }
            Event::ValentineSelected { id } => ScreenInput::ValentineSelected(*id),
            Event::DeleteRequested { id } => ScreenInput::DeleteRequested(*id),
            _ => return None,
        };
        Some(input)
    }
}
