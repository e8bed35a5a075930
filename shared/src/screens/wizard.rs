use tracing::debug;

use super::{labels, routes, AppScreen, BarAction, RouteParams, ScreenContext, ScreenInput};
use crate::bottom_bar::BarItem;
use crate::form::{is_valid_signature, is_valid_text};
use crate::model::{EmployeeId, ImageId, UploadFile};
use crate::pending::Completed;
use crate::router::Screen;
use crate::view::{FilePreview, Icon, PrivacyMode, ScreenView, Slide};

// --- Step 1: recipient ---

#[derive(Debug, Default)]
pub struct ChoseEmployeeScreen {
    selected: Option<EmployeeId>,
}

impl Screen for ChoseEmployeeScreen {
    type Context = ScreenContext;
    type Params = RouteParams;

    fn root(&self) -> &str {
        "chose-employee"
    }

    fn show(&mut self, _params: &RouteParams, cx: &mut ScreenContext) {
        cx.form.reset();
        self.selected = None;
    }
}

impl AppScreen for ChoseEmployeeScreen {
    fn handle(&mut self, input: &ScreenInput, cx: &mut ScreenContext) {
        match input {
            ScreenInput::EmployeeToggled(id) => {
                if self.selected == Some(*id) {
                    self.selected = None;
                    cx.bottom_bar.hide();
                    return;
                }
                let offered = cx
                    .collections
                    .recipients_for(cx.current_employee)
                    .iter()
                    .any(|e| e.id == *id);
                if offered {
                    self.selected = Some(*id);
                    cx.offer_label(labels::NEXT, BarAction::SubmitEmployee);
                } else {
                    debug!(%id, "employee is not an available recipient");
                }
            }
            ScreenInput::BarAction(BarAction::SubmitEmployee) => {
                if let Some(id) = self.selected {
                    cx.form.recipient_id = Some(id);
                    cx.navigate(routes::CHOSE_IMAGE, RouteParams::default());
                }
            }
            _ => {}
        }
    }

    fn view(&self, cx: &ScreenContext) -> ScreenView {
        let employees = cx
            .collections
            .recipients_for(cx.current_employee)
            .iter()
            .filter_map(|e| cx.employee_card(e.id))
            .collect();
        ScreenView::ChoseEmployee {
            employees,
            selected: self.selected,
        }
    }
}

// --- Step 2: image carousel ---

/// Slides are the known images followed by one upload slot.
#[derive(Debug, Default)]
pub struct ChoseImageScreen {
    active: usize,
    preview: Option<UploadFile>,
    error: Option<String>,
}

impl ChoseImageScreen {
    fn slide_count(cx: &ScreenContext) -> usize {
        cx.collections.images.all().len() + 1
    }

    fn active_image(&self, cx: &ScreenContext) -> Option<ImageId> {
        cx.collections.images.all().get(self.active).map(|i| i.id)
    }

    fn move_to(&mut self, index: usize, cx: &mut ScreenContext) {
        self.active = index.min(Self::slide_count(cx) - 1);
        self.sync_bar(cx);
    }

    fn sync_bar(&self, cx: &mut ScreenContext) {
        if self.active_image(cx).is_some() {
            cx.offer_label(labels::NEXT, BarAction::SubmitImage);
        } else if self.preview.is_some() {
            cx.offer(
                vec![BarItem::Icon(Icon::Upload), BarItem::text(labels::UPLOAD)],
                BarAction::UploadImage,
            );
        } else {
            cx.bottom_bar.hide();
        }
    }
}

impl Screen for ChoseImageScreen {
    type Context = ScreenContext;
    type Params = RouteParams;

    fn root(&self) -> &str {
        "chose-image"
    }

    fn show(&mut self, _params: &RouteParams, cx: &mut ScreenContext) {
        self.preview = None;
        self.error = None;
        let start = cx
            .form
            .image_id
            .and_then(|id| cx.collections.images.all().iter().position(|i| i.id == id))
            .unwrap_or(0);
        self.move_to(start, cx);
    }
}

impl AppScreen for ChoseImageScreen {
    fn handle(&mut self, input: &ScreenInput, cx: &mut ScreenContext) {
        if cx.bottom_bar.is_loading() && !matches!(input, ScreenInput::OperationFinished(_)) {
            debug!("upload in progress, carousel locked");
            return;
        }

        match input {
            ScreenInput::CarouselMoved { index } => self.move_to(*index, cx),
            ScreenInput::CarouselNext => {
                let next = (self.active + 1) % Self::slide_count(cx);
                self.move_to(next, cx);
            }
            ScreenInput::CarouselPrev => {
                let count = Self::slide_count(cx);
                self.move_to((self.active + count - 1) % count, cx);
            }
            ScreenInput::FileChosen(file) => {
                self.preview = Some(file.clone());
                self.error = None;
                let upload_slot = Self::slide_count(cx) - 1;
                self.move_to(upload_slot, cx);
            }
            ScreenInput::FileRemoved => {
                self.preview = None;
                self.sync_bar(cx);
            }
            ScreenInput::BarAction(BarAction::UploadImage) => {
                if let Some(file) = self.preview.clone() {
                    self.error = None;
                    cx.begin_loading(labels::UPLOADING);
                    cx.commands.push(super::Command::UploadImage(file));
                }
            }
            ScreenInput::OperationFinished(Ok(Completed::Uploaded(image))) => {
                cx.end_loading();
                self.preview = None;
                let index = cx
                    .collections
                    .images
                    .all()
                    .iter()
                    .position(|i| i.id == image.id)
                    .unwrap_or(0);
                self.move_to(index, cx);
            }
            ScreenInput::OperationFinished(Err(message)) => {
                cx.end_loading();
                self.error = Some(message.clone());
            }
            ScreenInput::BarAction(BarAction::SubmitImage) => {
                if let Some(id) = self.active_image(cx) {
                    cx.form.image_id = Some(id);
                    cx.navigate(routes::WRITE_TEXT, RouteParams::default());
                }
            }
            _ => {}
        }
    }

    fn view(&self, cx: &ScreenContext) -> ScreenView {
        let mut slides: Vec<Slide> = cx
            .collections
            .images
            .all()
            .iter()
            .map(|i| Slide::Image {
                id: i.id,
                url: i.image.clone(),
            })
            .collect();
        slides.push(Slide::Upload);

        ScreenView::ChoseImage {
            slides,
            active: self.active,
            preview: self.preview.as_ref().map(|f| FilePreview {
                file_name: f.file_name.clone(),
                mime_type: f.mime_type.clone(),
                size: f.bytes.len(),
            }),
            error: self.error.clone(),
        }
    }
}

// --- Step 3: text ---

#[derive(Debug, Default)]
pub struct WriteTextScreen {
    text: String,
}

impl WriteTextScreen {
    fn sync_bar(&self, cx: &mut ScreenContext) {
        if is_valid_text(&self.text, cx.config.min_text_len) {
            cx.offer_label(labels::NEXT, BarAction::SubmitText);
        } else {
            cx.bottom_bar.hide();
        }
    }
}

impl Screen for WriteTextScreen {
    type Context = ScreenContext;
    type Params = RouteParams;

    fn root(&self) -> &str {
        "write-text"
    }

    fn show(&mut self, _params: &RouteParams, cx: &mut ScreenContext) {
        self.text.clone_from(&cx.form.text);
        self.sync_bar(cx);
    }
}

impl AppScreen for WriteTextScreen {
    fn handle(&mut self, input: &ScreenInput, cx: &mut ScreenContext) {
        match input {
            ScreenInput::TextChanged(text) => {
                self.text.clone_from(text);
                self.sync_bar(cx);
            }
            ScreenInput::BarAction(BarAction::SubmitText)
                if is_valid_text(&self.text, cx.config.min_text_len) =>
            {
                cx.form.text.clone_from(&self.text);
                cx.navigate(routes::SENDING_PRIVACY, RouteParams::default());
            }
            _ => {}
        }
    }

    fn view(&self, cx: &ScreenContext) -> ScreenView {
        ScreenView::WriteText {
            text: self.text.clone(),
            min_len: cx.config.min_text_len,
            is_valid: is_valid_text(&self.text, cx.config.min_text_len),
        }
    }
}

// --- Step 4: public or anonymous ---

#[derive(Debug, Default)]
pub struct SendingPrivacyScreen {
    mode: PrivacyMode,
    signature: String,
}

impl SendingPrivacyScreen {
    fn is_valid(&self, cx: &ScreenContext) -> bool {
        match self.mode {
            PrivacyMode::Public => true,
            PrivacyMode::Anonymous => is_valid_signature(&self.signature, cx.config.min_signature_len),
        }
    }

    fn sync_bar(&self, cx: &mut ScreenContext) {
        if self.is_valid(cx) {
            cx.offer_label(labels::NEXT, BarAction::SubmitPrivacy);
        } else {
            cx.bottom_bar.hide();
        }
    }
}

impl Screen for SendingPrivacyScreen {
    type Context = ScreenContext;
    type Params = RouteParams;

    fn root(&self) -> &str {
        "sending-privacy"
    }

    /// Always opens public with an empty signature; anonymity is an explicit choice.
    fn show(&mut self, _params: &RouteParams, cx: &mut ScreenContext) {
        self.mode = PrivacyMode::Public;
        self.signature.clear();
        self.sync_bar(cx);
    }
}

impl AppScreen for SendingPrivacyScreen {
    fn handle(&mut self, input: &ScreenInput, cx: &mut ScreenContext) {
        match input {
            ScreenInput::PrivacyModeChanged(mode) => {
                self.mode = *mode;
                self.sync_bar(cx);
            }
            ScreenInput::SignatureChanged(signature) => {
                self.signature.clone_from(signature);
                self.sync_bar(cx);
            }
            ScreenInput::BarAction(BarAction::SubmitPrivacy) if self.is_valid(cx) => {
                cx.form.is_anonymous = self.mode == PrivacyMode::Anonymous;
                if cx.form.is_anonymous {
                    cx.form.anonymous_signature = self.signature.trim().to_string();
                }
                cx.navigate(routes::CHECK, RouteParams::default());
            }
            _ => {}
        }
    }

    fn view(&self, cx: &ScreenContext) -> ScreenView {
        ScreenView::SendingPrivacy {
            mode: self.mode,
            signature: self.signature.clone(),
            min_len: cx.config.min_signature_len,
            is_valid: self.is_valid(cx),
        }
    }
}

// --- Step 5: review and send ---

#[derive(Debug, Default)]
pub struct CheckScreen {
    error: Option<String>,
}

impl Screen for CheckScreen {
    type Context = ScreenContext;
    type Params = RouteParams;

    fn root(&self) -> &str {
        "check"
    }

    fn show(&mut self, _params: &RouteParams, cx: &mut ScreenContext) {
        self.error = None;
        cx.offer(
            vec![BarItem::Icon(Icon::Heart), BarItem::text(labels::SEND)],
            BarAction::SubmitCheck,
        );
    }
}

impl AppScreen for CheckScreen {
    fn handle(&mut self, input: &ScreenInput, cx: &mut ScreenContext) {
        match input {
            ScreenInput::BarAction(BarAction::SubmitCheck) => {
                if !cx.form.is_valid() {
                    self.error = Some(labels::INCOMPLETE_FORM.to_string());
                    return;
                }
                self.error = None;
                cx.begin_loading(labels::SAVING);
                cx.commands.push(super::Command::CreateValentine);
            }
            ScreenInput::OperationFinished(Ok(Completed::Created(_))) => {
                cx.end_loading();
                cx.navigate(
                    routes::MY_VALENTINES_LIST,
                    RouteParams {
                        show_create_button: true,
                        ..RouteParams::default()
                    },
                );
            }
            ScreenInput::OperationFinished(Err(message)) => {
                cx.end_loading();
                self.error = Some(message.clone());
            }
            _ => {}
        }
    }

    fn view(&self, cx: &ScreenContext) -> ScreenView {
        let form = &cx.form;
        ScreenView::Check {
            recipient: form.recipient_id.and_then(|id| cx.employee_card(id)),
            image_url: form.image_id.and_then(|id| cx.image_url(id)),
            text: form.text.clone(),
            sender_line: form.sender_line(),
            error: self.error.clone(),
        }
    }
}
