use std::collections::HashSet;

use tracing::{debug, error, info, warn};

use crate::api::{decode, expect_success, ApiClient, ApiError};
use crate::capabilities::{Capabilities, HttpRequest, HttpResult};
use crate::collections::{MyValentineCollection, ValentineImageCollection};
use crate::config::AppConfig;
use crate::event::{Event, LoadSource};
use crate::model::{
    Employee, ReceivedValentines, TokenGrant, Valentine, ValentineImage,
};
use crate::pending::{Completed, OpId, Outcome, PendingOps, Ready};
use crate::router::{Transition, TransitionState};
use crate::screens::{self, routes, AppRouter, Command, RouteParams, ScreenContext, ScreenInput};
use crate::view::{ScreenView, UserFacingError, ViewModel};
use crate::{AppError, AppResult};

#[derive(Default)]
pub struct App;

pub struct Model {
    pub router: AppRouter,
    pub cx: ScreenContext,
    pub api: ApiClient,
    pub pending: PendingOps,
    /// Sources still outstanding during start-up; `None` once settled.
    pub bootstrap: Option<HashSet<LoadSource>>,
    pub telegram_user_id: Option<String>,
    pub error: Option<AppError>,
}

impl Model {
    #[must_use]
    pub fn with_config(config: AppConfig) -> Self {
        let mut router = AppRouter::new(config.screen_fade_ms);
        if let Err(e) = screens::register_all(&mut router) {
            error!(error = %e, "screen registration failed");
        }

        Self {
            router,
            api: ApiClient::new(config.base_url.clone())
                .with_csrf_token(config.csrf_token.clone()),
            cx: ScreenContext::new(config),
            pending: PendingOps::default(),
            bootstrap: None,
            telegram_user_id: None,
            error: None,
        }
    }

    #[must_use]
    pub fn current_route(&self) -> Option<&str> {
        self.router.current()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::with_config(AppConfig::default())
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        match event {
            Event::Start {
                config,
                telegram_user_id,
            } => self.start(config, telegram_user_id, model, caps),
            Event::NavigationTriggered { route } => {
                self.navigate(&route, RouteParams::default(), model, caps);
            }
            Event::BackRequested => match model.router.back(RouteParams::default(), &mut model.cx) {
                Ok(transition) => Self::schedule_fade(&transition, caps),
                Err(e) => debug!(error = %e, "back navigation ignored"),
            },
            Event::BottomBarClicked => match model.cx.bottom_bar.click().copied() {
                Some(action) => Self::dispatch(ScreenInput::BarAction(action), model),
                None => debug!("bottom bar click ignored"),
            },
            Event::ErrorDismissed => model.error = None,

            Event::TokenReceived {
                telegram_user_id,
                result,
            } => self.token_received(&telegram_user_id, *result, model, caps),
            Event::CollectionLoaded { source, result } => {
                self.collection_loaded(source, *result, model, caps);
            }
            Event::ImageUploaded { op, result } => {
                let outcome = decode::<ValentineImage>(*result).map(|image| {
                    model.cx.collections.images.add(image.clone());
                    Completed::Uploaded(image)
                });
                Self::complete(op, outcome, model);
            }
            Event::ValentineCreated { op, result } => {
                let outcome = decode::<Valentine>(*result).map(|valentine| {
                    let id = valentine.id;
                    model.cx.collections.my_valentines.confirm_created(valentine);
                    Completed::Created(id)
                });
                Self::complete(op, outcome, model);
            }
            Event::ValentineDeleted { op, id, result } => {
                let outcome = expect_success(*result).map(|()| {
                    if let Err(e) = model.cx.collections.my_valentines.confirm_deleted(id) {
                        debug!(error = %e, "deleted valentine already gone locally");
                    }
                    Completed::Deleted(id)
                });
                Self::complete(op, outcome, model);
            }
            Event::MarkedRead { id, result } => match expect_success(*result) {
                Ok(()) => {
                    if let Err(e) = model.cx.collections.received.confirm_read(id) {
                        debug!(error = %e, "read valentine missing locally");
                    }
                }
                Err(e) => Self::report(e.into(), model),
            },
            Event::MinDisplayElapsed { op } => {
                if let Some(ready) = model.pending.record_elapsed(op) {
                    Self::deliver(ready, model);
                }
            }
            Event::FadeElapsed { seq } => match model.router.finish_fade(seq, &mut model.cx) {
                Ok(Some(transition)) => Self::schedule_fade(&transition, caps),
                Ok(None) => {}
                Err(e) => Self::report(e.into(), model),
            },

            other => match other.screen_input() {
                Some(input) => Self::dispatch(input, model),
                None => debug!(?other, "event not handled"),
            },
        }

        self.run_commands(model, caps);
        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        let displayed = model.router.displayed();
        let screen = displayed
            .and_then(|route| model.router.screen(route))
            .map_or(ScreenView::Blank, |screen| screen.view(&model.cx));

        ViewModel {
            route: displayed.map(ToString::to_string),
            transition: model.router.transition_state(),
            fade_ms: model.router.fade_ms(),
            screen,
            bottom_bar: model.cx.bottom_bar.view(),
            error: model.error.as_ref().map(UserFacingError::from),
        }
    }
}

impl App {
    // --- Bootstrap ---

    fn start(
        &self,
        config: Option<AppConfig>,
        telegram_user_id: Option<String>,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        let (config, config_error) = match config.map(|c| c.validate().map(|()| c)) {
            Some(Ok(config)) => (config, None),
            Some(Err(e)) => {
                error!(error = %e, "invalid config, using defaults");
                (AppConfig::default(), Some(AppError::from(e)))
            }
            None => (AppConfig::default(), None),
        };
        *model = Model::with_config(config);
        model.error = config_error;

        let telegram_user_id = telegram_user_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| {
                warn!("no telegram user id supplied, using fallback");
                model.cx.config.fallback_telegram_user_id.clone()
            });
        model.telegram_user_id = Some(telegram_user_id.clone());
        info!(telegram_user_id = %telegram_user_id, "starting");

        self.navigate(routes::PRELOAD, RouteParams::default(), model, caps);

        match model.api.get_token(&telegram_user_id) {
            Ok(request) => caps.http.send(request, move |result| Event::TokenReceived {
                telegram_user_id,
                result: Box::new(result),
            }),
            Err(e) => self.token_failed(&telegram_user_id, &e.into(), model, caps),
        }
    }

    fn token_received(
        &self,
        telegram_user_id: &str,
        result: HttpResult,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        match decode::<TokenGrant>(result) {
            Ok(grant) => {
                info!(employee_id = %grant.employee_id, "authenticated");
                model.api.authenticate(&grant);
                model.cx.current_employee = Some(grant.employee_id);
                model.bootstrap = Some(LoadSource::ALL.into_iter().collect());
                for source in LoadSource::ALL {
                    self.load(source, model, caps);
                }
            }
            Err(e) => self.token_failed(telegram_user_id, &e.into(), model, caps),
        }
    }

    fn token_failed(
        &self,
        telegram_user_id: &str,
        err: &AppError,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        warn!(code = err.code(), error = %err, "token request failed");
        let message =
            format!("Cant get token, unknown telegram id.\ntelegram_user_id: {telegram_user_id}");
        self.navigate(routes::ERROR, RouteParams::error(message, false), model, caps);
    }

    fn load(&self, source: LoadSource, model: &mut Model, caps: &Capabilities) {
        let api = &model.api;
        let request = match source {
            LoadSource::Employees => api.employee_list(),
            LoadSource::Images => api.valentine_image_list(),
            LoadSource::MyValentines => api.valentine_list(),
            LoadSource::Received => api.received_valentines(),
        };

        match request {
            Ok(request) => caps.http.send(request, move |result| Event::CollectionLoaded {
                source,
                result: Box::new(result),
            }),
            Err(e) => self.collection_failed(source, e.into(), model, caps),
        }
    }

    fn collection_loaded(
        &self,
        source: LoadSource,
        result: HttpResult,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        let collections = &mut model.cx.collections;
        let applied: Result<(), ApiError> = match source {
            LoadSource::Employees => decode::<Vec<Employee>>(result)
                .map(|employees| collections.employees.load_all(employees)),
            LoadSource::Images => decode::<Vec<ValentineImage>>(result)
                .map(|images| collections.images.load_all(images)),
            LoadSource::MyValentines => decode::<Vec<Valentine>>(result)
                .map(|valentines| collections.my_valentines.load_all(valentines)),
            LoadSource::Received => decode::<ReceivedValentines>(result)
                .map(|received| collections.received.load_all(received)),
        };

        if let Err(e) = applied {
            self.collection_failed(source, e.into(), model, caps);
            return;
        }
        debug!(?source, "collection loaded");

        if source == LoadSource::Received {
            Self::deliver_to(routes::RECEIVED_LIST, &ScreenInput::ReceivedLoaded(Ok(())), model);
        }

        if let Some(remaining) = model.bootstrap.as_mut() {
            remaining.remove(&source);
            if remaining.is_empty() {
                model.bootstrap = None;
                info!("initial load complete");
                self.navigate(routes::MAIN, RouteParams::default(), model, caps);
            }
        }
    }

    fn collection_failed(
        &self,
        source: LoadSource,
        err: AppError,
        model: &mut Model,
        caps: &Capabilities,
    ) {
        warn!(?source, code = err.code(), error = %err, "collection load failed");
        if model.bootstrap.take().is_some() {
            let params = RouteParams::error(err.user_facing_message(), false);
            self.navigate(routes::ERROR, params, model, caps);
        } else if source == LoadSource::Received {
            let input = ScreenInput::ReceivedLoaded(Err(err.user_facing_message()));
            Self::deliver_to(routes::RECEIVED_LIST, &input, model);
        } else {
            model.error = Some(err);
        }
    }

    // --- Navigation ---

    fn navigate(&self, route: &str, params: RouteParams, model: &mut Model, caps: &Capabilities) {
        match model.router.go(route, params, &mut model.cx) {
            Ok(transition) => Self::schedule_fade(&transition, caps),
            Err(e) => {
                warn!(error = %e, route, "navigation failed");
                model.error = Some(e.into());
            }
        }
    }

    fn schedule_fade(transition: &Transition, caps: &Capabilities) {
        if let Some((seq, millis)) = transition.timer() {
            caps.timer.start(millis, move |_| Event::FadeElapsed { seq });
        }
    }

    // --- Screens ---

    /// Hands input to the screen on display. Input during an exit fade has no screen to go to.
    fn dispatch(input: ScreenInput, model: &mut Model) {
        if matches!(
            model.router.transition_state(),
            TransitionState::FadingOut { .. }
        ) {
            debug!("input dropped during exit fade");
            return;
        }
        match model.router.current_screen_mut() {
            Some(screen) => screen.handle(&input, &mut model.cx),
            None => debug!("no current screen"),
        }
    }

    fn deliver_to(route: &str, input: &ScreenInput, model: &mut Model) {
        if let Some(screen) = model.router.screen_mut(route) {
            screen.handle(input, &mut model.cx);
        }
    }

    fn run_commands(&self, model: &mut Model, caps: &Capabilities) {
        loop {
            let commands = std::mem::take(&mut model.cx.commands);
            if commands.is_empty() {
                break;
            }
            for command in commands {
                self.run_command(command, model, caps);
            }
        }
    }

    fn run_command(&self, command: Command, model: &mut Model, caps: &Capabilities) {
        match command {
            Command::Navigate { route, params } => self.navigate(&route, params, model, caps),
            Command::LoadReceived => self.load(LoadSource::Received, model, caps),
            Command::MarkRead(id) => {
                match model
                    .cx
                    .collections
                    .received
                    .mark_read_request(&model.api, id)
                {
                    Ok(request) => caps.http.send(request, move |result| Event::MarkedRead {
                        id,
                        result: Box::new(result),
                    }),
                    Err(e) => Self::report(e, model),
                }
            }
            Command::UploadImage(file) => {
                let request =
                    ValentineImageCollection::upload_request(&model.api, &file).map_err(Into::into);
                let min_display = model.cx.config.upload_min_display_ms;
                Self::start_op(
                    request,
                    min_display,
                    |op, result| Event::ImageUploaded {
                        op,
                        result: Box::new(result),
                    },
                    model,
                    caps,
                );
            }
            Command::CreateValentine => {
                let request = MyValentineCollection::create_request(&model.api, &model.cx.form);
                let min_display = model.cx.config.save_min_display_ms;
                Self::start_op(
                    request,
                    min_display,
                    |op, result| Event::ValentineCreated {
                        op,
                        result: Box::new(result),
                    },
                    model,
                    caps,
                );
            }
            Command::DeleteValentine(id) => {
                let request = model
                    .cx
                    .collections
                    .my_valentines
                    .delete_request(&model.api, id);
                let min_display = model.cx.config.save_min_display_ms;
                Self::start_op(
                    request,
                    min_display,
                    move |op, result| Event::ValentineDeleted {
                        op,
                        id,
                        result: Box::new(result),
                    },
                    model,
                    caps,
                );
            }
        }
    }

    // --- Operations with a minimum loading display ---

    fn start_op<F>(
        request: AppResult<HttpRequest>,
        min_display_ms: u64,
        to_event: F,
        model: &mut Model,
        caps: &Capabilities,
    ) where
        F: FnOnce(OpId, HttpResult) -> Event + Send + 'static,
    {
        let origin = model.router.current().unwrap_or_default().to_string();
        let visit = model.router.visit();
        match request {
            Ok(request) => {
                let op = model.pending.start(origin, visit);
                caps.http.send(request, move |result| to_event(op, result));
                caps.timer
                    .start(min_display_ms, move |_| Event::MinDisplayElapsed { op });
            }
            Err(e) => {
                let ready = Ready {
                    op: OpId::new(),
                    origin,
                    visit,
                    outcome: Err(failure_message(&e)),
                };
                Self::deliver(ready, model);
            }
        }
    }

    fn complete(op: OpId, outcome: Result<Completed, ApiError>, model: &mut Model) {
        let outcome: Outcome = outcome.map_err(|e| failure_message(&e.into()));
        if let Some(ready) = model.pending.record_response(op, outcome) {
            Self::deliver(ready, model);
        }
    }

    /// Results only reach the screen visit that started them.
    fn deliver(ready: Ready, model: &mut Model) {
        if model.router.current() == Some(ready.origin.as_str())
            && model.router.visit() == ready.visit
        {
            Self::dispatch(ScreenInput::OperationFinished(ready.outcome), model);
        } else {
            debug!(op = %ready.op, origin = %ready.origin, "origin screen left, result dropped");
        }
    }

    fn report(err: AppError, model: &mut Model) {
        warn!(code = err.code(), error = %err, "operation failed");
        model.error = Some(err);
    }
}

fn failure_message(err: &AppError) -> String {
    warn!(code = err.code(), error = %err, "operation failed");
    err.user_facing_message()
}
