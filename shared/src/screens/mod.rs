//! Screens and the context they share.
//!
//! Screens never talk to the network themselves. They mutate [`ScreenContext`] (form, bar) and
//! queue [`Command`]s that the app executes after the screen returns.

mod lists;
mod misc;
mod wizard;

pub use self::lists::{
    MyValentineDeleteScreen, MyValentineDetailScreen, MyValentinesListScreen,
    ReceivedDetailScreen, ReceivedListScreen,
};
pub use self::misc::{AboutScreen, ErrorScreen, MainScreen, PreloadScreen};
pub use self::wizard::{
    CheckScreen, ChoseEmployeeScreen, ChoseImageScreen, SendingPrivacyScreen, WriteTextScreen,
};

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::bottom_bar::{BarItem, BottomBar};
use crate::collections::Collections;
use crate::config::AppConfig;
use crate::form::FormState;
use crate::model::{EmployeeId, ImageId, UploadFile, Valentine, ValentineId};
use crate::pending::Outcome;
use crate::router::{RouterError, Screen, ScreenHost, ScreenRouter};
use crate::view::{EmployeeCard, PrivacyMode, ReceivedCard, ScreenView, SentCard, SentItem};

pub mod routes {
    pub const PRELOAD: &str = "preload";
    pub const MAIN: &str = "main";
    pub const ABOUT: &str = "about";
    pub const ERROR: &str = "error-screen";
    pub const CHOSE_EMPLOYEE: &str = "form/chose-employee";
    pub const CHOSE_IMAGE: &str = "form/chose-image";
    pub const WRITE_TEXT: &str = "form/write-text";
    pub const SENDING_PRIVACY: &str = "form/sending-privacy";
    pub const CHECK: &str = "form/check";
    pub const MY_VALENTINES_LIST: &str = "my-valentines-list";
    pub const MY_VALENTINES_DETAIL: &str = "my-valentines-detail";
    pub const MY_VALENTINES_DELETE: &str = "my-valentines-delete";
    pub const RECEIVED_LIST: &str = "received-valentines";
    pub const RECEIVED_DETAIL: &str = "received-valentines-detail";
}

pub mod labels {
    pub const NEXT: &str = "Далее";
    pub const UPLOAD: &str = "Загрузить";
    pub const UPLOADING: &str = "Загружаю";
    pub const SEND: &str = "Направить стрелу любви";
    pub const SAVING: &str = "Сохраняю";
    pub const SEND_ANOTHER: &str = "Отправить еще";
    pub const DELETE: &str = "Удалить";
    pub const DELETING: &str = "Удаляю";
    pub const NO_VALENTINES: &str = "У вас пока нет созданных валентинок";
    pub const UNKNOWN_ERROR: &str = "Что-то пошло не так";
    pub const INCOMPLETE_FORM: &str = "Заполните все шаги перед отправкой";
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteParams {
    pub valentine_id: Option<ValentineId>,
    pub message: Option<String>,
    pub show_close_button: bool,
    pub show_create_button: bool,
}

impl RouteParams {
    #[must_use]
    pub fn valentine(id: ValentineId) -> Self {
        Self {
            valentine_id: Some(id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>, show_close_button: bool) -> Self {
        Self {
            message: Some(message.into()),
            show_close_button,
            ..Self::default()
        }
    }
}

/// Work a screen asks the app to do once the screen call returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Navigate { route: String, params: RouteParams },
    LoadReceived,
    MarkRead(ValentineId),
    UploadImage(UploadFile),
    CreateValentine,
    DeleteValentine(ValentineId),
}

/// Action wired to the bottom bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarAction {
    SubmitEmployee,
    UploadImage,
    SubmitImage,
    SubmitText,
    SubmitPrivacy,
    SubmitCheck,
    ConfirmDelete(ValentineId),
    SendAnother,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenInput {
    EmployeeToggled(EmployeeId),
    CarouselMoved { index: usize },
    CarouselNext,
    CarouselPrev,
    FileChosen(UploadFile),
    FileRemoved,
    TextChanged(String),
    PrivacyModeChanged(PrivacyMode),
    SignatureChanged(String),
    ValentineSelected(ValentineId),
    DeleteRequested(ValentineId),
    BarAction(BarAction),
    OperationFinished(Outcome),
    ReceivedLoaded(Result<(), String>),
}

pub struct ScreenContext {
    pub config: AppConfig,
    pub form: FormState,
    pub collections: Collections,
    pub bottom_bar: BottomBar<BarAction>,
    pub current_employee: Option<EmployeeId>,
    pub commands: Vec<Command>,
}

impl ScreenContext {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self {
            form: FormState::new(config.anonymous_placeholder.clone()),
            config,
            collections: Collections::default(),
            bottom_bar: BottomBar::default(),
            current_employee: None,
            commands: Vec::new(),
        }
    }

    pub fn navigate(&mut self, route: &str, params: RouteParams) {
        self.commands.push(Command::Navigate {
            route: route.to_string(),
            params,
        });
    }

    /// Shows `items` on an enabled bar wired to `action`.
    pub fn offer(&mut self, items: Vec<BarItem>, action: BarAction) {
        if let Err(e) = self.bottom_bar.show(items) {
            error!(error = %e, ?action, "bottom bar refused content");
            return;
        }
        self.bottom_bar.set_disabled(false);
        self.bottom_bar.set_click_handler(action);
    }

    pub fn offer_label(&mut self, label: &str, action: BarAction) {
        self.offer(vec![BarItem::text(label)], action);
    }

    pub fn begin_loading(&mut self, label: &str) {
        self.bottom_bar.set_disabled(true);
        if let Err(e) = self.bottom_bar.show_loading(label) {
            error!(error = %e, "bottom bar loading");
        }
    }

    /// Puts the bar back to what it showed before [`Self::begin_loading`].
    pub fn end_loading(&mut self) {
        if self.bottom_bar.is_loading() {
            if let Err(e) = self.bottom_bar.hide_loading() {
                error!(error = %e, "bottom bar loading");
            }
        }
        self.bottom_bar.set_disabled(false);
    }

    fn avatar_or_default(&self, avatar: Option<&str>) -> String {
        avatar
            .filter(|a| !a.is_empty())
            .unwrap_or(self.config.default_avatar.as_str())
            .to_string()
    }

    #[must_use]
    pub fn employee_card(&self, id: EmployeeId) -> Option<EmployeeCard> {
        self.collections
            .employees
            .get_by_id(id)
            .ok()
            .map(|e| EmployeeCard {
                id: e.id,
                full_name: e.full_name(),
                position: e.position.clone(),
                avatar: self.avatar_or_default(e.avatar.as_deref()),
            })
    }

    #[must_use]
    pub fn image_url(&self, id: ImageId) -> Option<String> {
        self.collections
            .images
            .get_by_id(id)
            .ok()
            .map(|image| image.image.clone())
    }

    fn recipient_name(&self, id: EmployeeId) -> String {
        self.collections
            .employees
            .get_by_id(id)
            .map_or_else(|_| format!("#{id}"), |e| e.full_name())
    }

    #[must_use]
    pub fn sent_item(&self, valentine: &Valentine) -> SentItem {
        let avatar = self
            .collections
            .employees
            .get_by_id(valentine.recipient_id)
            .ok()
            .and_then(|e| e.avatar.as_deref());
        SentItem {
            id: valentine.id,
            recipient_name: self.recipient_name(valentine.recipient_id),
            recipient_avatar: self.avatar_or_default(avatar),
        }
    }

    #[must_use]
    pub fn sent_card(&self, valentine: &Valentine) -> SentCard {
        SentCard {
            id: valentine.id,
            text: valentine.text.clone(),
            image_url: self.image_url(valentine.image_id),
            recipient_name: self.recipient_name(valentine.recipient_id),
            signature_line: valentine.signature_line(),
        }
    }

    /// Anonymous cards hide the sender behind the signature and the default avatar.
    #[must_use]
    pub fn received_card(&self, valentine: &Valentine) -> ReceivedCard {
        let (sender_name, avatar) = if valentine.is_anonymous {
            (
                valentine.anonymous_signature.clone(),
                self.config.default_avatar.clone(),
            )
        } else {
            match self.collections.employees.get_by_id(valentine.sender_id) {
                Ok(sender) => (
                    sender.full_name(),
                    self.avatar_or_default(sender.avatar.as_deref()),
                ),
                Err(_) => (
                    self.config.anonymous_placeholder.clone(),
                    self.config.default_avatar.clone(),
                ),
            }
        };

        ReceivedCard {
            id: valentine.id,
            sender_name,
            avatar,
            text: valentine.text.clone(),
            image_url: self.image_url(valentine.image_id),
            is_anonymous: valentine.is_anonymous,
            is_read: valentine.is_read_by_recipient,
        }
    }
}

impl Default for ScreenContext {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl ScreenHost for ScreenContext {
    fn release(&mut self) {
        self.bottom_bar.close(true);
    }
}

pub trait AppScreen: Screen<Context = ScreenContext, Params = RouteParams> + Send + Sync {
    fn handle(&mut self, _input: &ScreenInput, _cx: &mut ScreenContext) {}

    fn view(&self, cx: &ScreenContext) -> ScreenView;
}

pub type AppRouter = ScreenRouter<dyn AppScreen>;

pub fn register_all(router: &mut AppRouter) -> Result<(), RouterError> {
    router.register(routes::PRELOAD, Box::new(PreloadScreen))?;
    router.register(routes::MAIN, Box::new(MainScreen))?;
    router.register(routes::ABOUT, Box::new(AboutScreen))?;
    router.register(routes::ERROR, Box::new(ErrorScreen::default()))?;
    router.register(routes::CHOSE_EMPLOYEE, Box::new(ChoseEmployeeScreen::default()))?;
    router.register(routes::CHOSE_IMAGE, Box::new(ChoseImageScreen::default()))?;
    router.register(routes::WRITE_TEXT, Box::new(WriteTextScreen::default()))?;
    router.register(routes::SENDING_PRIVACY, Box::new(SendingPrivacyScreen::default()))?;
    router.register(routes::CHECK, Box::new(CheckScreen::default()))?;
    router.register(routes::MY_VALENTINES_LIST, Box::new(MyValentinesListScreen::default()))?;
    router.register(
        routes::MY_VALENTINES_DETAIL,
        Box::new(MyValentineDetailScreen::default()),
    )?;
    router.register(
        routes::MY_VALENTINES_DELETE,
        Box::new(MyValentineDeleteScreen::default()),
    )?;
    router.register(routes::RECEIVED_LIST, Box::new(ReceivedListScreen::default()))?;
    router.register(routes::RECEIVED_DETAIL, Box::new(ReceivedDetailScreen::default()))?;
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::bottom_bar::BarState;

    #[test]
    fn every_route_registers_once() {
        let mut router = AppRouter::new(400);
        register_all(&mut router).unwrap();
        assert!(router.is_registered(routes::CHECK));
        assert!(register_all(&mut router).is_err());
    }

    #[test]
    fn release_resets_the_bar() {
        let mut cx = ScreenContext::default();
        cx.offer_label(labels::NEXT, BarAction::SubmitText);
        cx.begin_loading(labels::SAVING);
        cx.release();
        assert_eq!(cx.bottom_bar.state(), BarState::Hidden);
        assert!(cx.bottom_bar.handler().is_none());
        assert!(!cx.bottom_bar.is_loading());
    }

    #[test]
    fn end_loading_restores_offer() {
        let mut cx = ScreenContext::default();
        cx.offer_label(labels::DELETE, BarAction::ConfirmDelete(ValentineId(1)));
        cx.begin_loading(labels::DELETING);
        assert_eq!(cx.bottom_bar.state(), BarState::Loading);
        cx.end_loading();
        assert_eq!(cx.bottom_bar.items(), vec![BarItem::text(labels::DELETE)]);
        assert_eq!(
            cx.bottom_bar.click(),
            Some(&BarAction::ConfirmDelete(ValentineId(1)))
        );
    }

    #[test]
    fn anonymous_received_card_hides_sender() {
        let cx = test_support::context();
        let mut valentine = test_support::valentine(9, 2, 1);
        valentine.is_anonymous = true;
        valentine.anonymous_signature = "Тайный друг".into();

        let card = cx.received_card(&valentine);
        assert_eq!(card.sender_name, "Тайный друг");
        assert_eq!(card.avatar, cx.config.default_avatar);

        valentine.is_anonymous = false;
        assert_eq!(cx.received_card(&valentine).sender_name, "Анна Иванов");
    }
}
