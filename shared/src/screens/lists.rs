use super::{labels, routes, AppScreen, BarAction, Command, RouteParams, ScreenContext, ScreenInput};
use crate::model::ValentineId;
use crate::pending::Completed;
use crate::router::Screen;
use crate::view::{ReceivedState, ScreenView};

// --- Sent ---

#[derive(Debug, Default)]
pub struct MyValentinesListScreen {
    show_create_button: bool,
}

impl Screen for MyValentinesListScreen {
    type Context = ScreenContext;
    type Params = RouteParams;

    fn root(&self) -> &str {
        "my-valentines-list"
    }

    fn show(&mut self, params: &RouteParams, cx: &mut ScreenContext) {
        self.show_create_button = params.show_create_button;
        if self.show_create_button {
            cx.offer_label(labels::SEND_ANOTHER, BarAction::SendAnother);
        }
    }
}

impl AppScreen for MyValentinesListScreen {
    fn handle(&mut self, input: &ScreenInput, cx: &mut ScreenContext) {
        match input {
            ScreenInput::ValentineSelected(id) => {
                cx.navigate(routes::MY_VALENTINES_DETAIL, RouteParams::valentine(*id));
            }
            ScreenInput::DeleteRequested(id) => {
                cx.navigate(routes::MY_VALENTINES_DELETE, RouteParams::valentine(*id));
            }
            ScreenInput::BarAction(BarAction::SendAnother) => {
                cx.navigate(routes::CHOSE_EMPLOYEE, RouteParams::default());
            }
            _ => {}
        }
    }

    fn view(&self, cx: &ScreenContext) -> ScreenView {
        let valentines = cx.collections.my_valentines.all();
        ScreenView::MyValentines {
            items: valentines.iter().map(|v| cx.sent_item(v)).collect(),
            empty_message: valentines
                .is_empty()
                .then(|| labels::NO_VALENTINES.to_string()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MyValentineDetailScreen {
    valentine_id: Option<ValentineId>,
}

impl Screen for MyValentineDetailScreen {
    type Context = ScreenContext;
    type Params = RouteParams;

    fn root(&self) -> &str {
        "my-valentines-detail"
    }

    fn show(&mut self, params: &RouteParams, _cx: &mut ScreenContext) {
        self.valentine_id = params.valentine_id;
    }
}

impl AppScreen for MyValentineDetailScreen {
    fn view(&self, cx: &ScreenContext) -> ScreenView {
        ScreenView::MyValentineDetail {
            card: self
                .valentine_id
                .and_then(|id| cx.collections.my_valentines.get_by_id(id).ok())
                .map(|v| cx.sent_card(v)),
        }
    }
}

#[derive(Debug, Default)]
pub struct MyValentineDeleteScreen {
    valentine_id: Option<ValentineId>,
    error: Option<String>,
}

impl Screen for MyValentineDeleteScreen {
    type Context = ScreenContext;
    type Params = RouteParams;

    fn root(&self) -> &str {
        "my-valentines-delete"
    }

    fn show(&mut self, params: &RouteParams, cx: &mut ScreenContext) {
        self.valentine_id = params.valentine_id;
        self.error = None;
        if let Some(id) = self.valentine_id {
            cx.offer_label(labels::DELETE, BarAction::ConfirmDelete(id));
        }
    }
}

impl AppScreen for MyValentineDeleteScreen {
    fn handle(&mut self, input: &ScreenInput, cx: &mut ScreenContext) {
        match input {
            ScreenInput::BarAction(BarAction::ConfirmDelete(id)) => {
                self.error = None;
                cx.begin_loading(labels::DELETING);
                cx.commands.push(Command::DeleteValentine(*id));
            }
            ScreenInput::OperationFinished(Ok(Completed::Deleted(_))) => {
                cx.end_loading();
                cx.navigate(routes::MY_VALENTINES_LIST, RouteParams::default());
            }
            ScreenInput::OperationFinished(Err(message)) => {
                cx.end_loading();
                self.error = Some(message.clone());
            }
            _ => {}
        }
    }

    fn view(&self, cx: &ScreenContext) -> ScreenView {
        ScreenView::MyValentineDelete {
            card: self
                .valentine_id
                .and_then(|id| cx.collections.my_valentines.get_by_id(id).ok())
                .map(|v| cx.sent_card(v)),
            error: self.error.clone(),
        }
    }
}

// --- Received ---

/// Reloads on every show; the holiday flag decides whether cards are visible yet.
#[derive(Debug, Default)]
pub struct ReceivedListScreen {
    loading: bool,
    error: Option<String>,
}

impl Screen for ReceivedListScreen {
    type Context = ScreenContext;
    type Params = RouteParams;

    fn root(&self) -> &str {
        "received-valentines"
    }

    fn show(&mut self, _params: &RouteParams, cx: &mut ScreenContext) {
        self.loading = true;
        self.error = None;
        cx.commands.push(Command::LoadReceived);
    }
}

impl AppScreen for ReceivedListScreen {
    fn handle(&mut self, input: &ScreenInput, cx: &mut ScreenContext) {
        match input {
            ScreenInput::ReceivedLoaded(result) => {
                self.loading = false;
                self.error = result.as_ref().err().cloned();
            }
            ScreenInput::ValentineSelected(id) => {
                cx.navigate(routes::RECEIVED_DETAIL, RouteParams::valentine(*id));
            }
            _ => {}
        }
    }

    fn view(&self, cx: &ScreenContext) -> ScreenView {
        let received = &cx.collections.received;
        let state = if self.loading {
            ReceivedState::Loading
        } else if !received.is_up_time() {
            ReceivedState::Wait
        } else if received.all().is_empty() {
            ReceivedState::Empty
        } else {
            ReceivedState::Cards {
                cards: received.all().iter().map(|v| cx.received_card(v)).collect(),
            }
        };
        ScreenView::Received {
            state,
            error: self.error.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ReceivedDetailScreen {
    valentine_id: Option<ValentineId>,
}

impl Screen for ReceivedDetailScreen {
    type Context = ScreenContext;
    type Params = RouteParams;

    fn root(&self) -> &str {
        "received-valentines-detail"
    }

    fn show(&mut self, params: &RouteParams, cx: &mut ScreenContext) {
        self.valentine_id = params.valentine_id;
        let unread = self
            .valentine_id
            .and_then(|id| cx.collections.received.get_by_id(id).ok())
            .filter(|v| !v.is_read_by_recipient)
            .map(|v| v.id);
        if let Some(id) = unread {
            cx.commands.push(Command::MarkRead(id));
        }
    }
}

impl AppScreen for ReceivedDetailScreen {
    fn view(&self, cx: &ScreenContext) -> ScreenView {
        ScreenView::ReceivedDetail {
            card: self
                .valentine_id
                .and_then(|id| cx.collections.received.get_by_id(id).ok())
                .map(|v| cx.received_card(v)),
        }
    }
}
