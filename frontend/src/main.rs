mod api;
mod components;

use std::rc::Rc;

use api::{BrowserImage, BrowserTransport};
use components::handlers;
use components::header::render_header;
use components::loading_screen::LoadingScreen;
use components::preview_area::render_preview_area;
use components::results::render_results;
use components::upload_section::render_upload_section;
use components::utils::render_error_message;
use gloo_file::File as GlooFile;
use shared::{ClientConfig, Completion, ResponseNormalizer, WorkflowController, WorkflowState};
use wasm_bindgen_futures::spawn_local;
use web_sys::DragEvent;
use yew::prelude::*;

/// Everything that only exists once the client config has arrived.
struct Session {
    controller: WorkflowController<BrowserImage>,
    transport: Rc<BrowserTransport>,
}

impl Session {
    fn new(config: &ClientConfig) -> Self {
        Self {
            controller: WorkflowController::new(ResponseNormalizer::new(
                config.fallback_ripeness.clone(),
            )),
            transport: Rc::new(BrowserTransport::new(config)),
        }
    }
}

// Yew msg components
enum Msg {
    ConfigLoaded(ClientConfig),
    SplashFinished,

    // Workflow
    FileSelected(GlooFile),
    UploadFinished(Completion),
    Acknowledge,

    // Input events
    SetDragging(bool),
    HandleDrop(DragEvent),
}

struct Model {
    session: Option<Session>,
    splash_done: bool,
    is_dragging: bool,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let link = ctx.link().clone();
        spawn_local(async move {
            let config = api::fetch_config().await;
            link.send_message(Msg::ConfigLoaded(config));
        });

        Self {
            session: None,
            splash_done: false,
            is_dragging: false,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::ConfigLoaded(config) => handlers::handle_config_loaded(self, config),
            Msg::SplashFinished => {
                self.splash_done = true;
                true
            }

            Msg::FileSelected(file) => handlers::handle_file_selected(self, ctx, file),
            Msg::UploadFinished(completion) => handlers::handle_upload_finished(self, completion),
            Msg::Acknowledge => handlers::handle_acknowledge(self),

            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }
            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();

        html! {
            <div class="container">
                if !self.splash_done {
                    <LoadingScreen
                        ready={self.session.is_some()}
                        on_finished={link.callback(|_| Msg::SplashFinished)}
                    />
                }

                <main class={classes!("content", self.splash_done.then_some("visible"))}>
                    { render_header() }
                    <div class="page">
                        { self.render_page(ctx) }
                    </div>
                </main>
            </div>
        }
    }
}

impl Model {
    fn render_page(&self, ctx: &Context<Self>) -> Html {
        let Some(session) = &self.session else {
            return html! {};
        };

        match session.controller.state() {
            WorkflowState::Idle => render_upload_section(self, ctx),
            WorkflowState::Uploading(file) => render_preview_area(file, ctx),
            WorkflowState::Succeeded(result) => render_results(result, ctx),
            WorkflowState::Failed(failure) => html! {
                <>
                    { render_error_message(failure, ctx) }
                    { render_upload_section(self, ctx) }
                </>
            },
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<Model>::new().render();
}
