use yew::prelude::*;
use yew_router::prelude::*;
use log::{info, Level};
use web_sys::MouseEvent;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

mod config;
mod mail;
mod region;
mod storage;
mod components {
    pub mod report_preview;
}
mod hooks {
    pub mod autosave;
    pub mod unload_warning;
}
mod wizard {
    pub mod route_guard;
    pub mod step_guard;
    pub mod step_page;
}
mod pages {
    pub mod dashboard;
    pub mod landing;
}

use pages::{
    dashboard::{Dashboard, NotFound},
    landing::Landing,
};
use wizard::{
    route_guard::{parse_requested_step, StepRouteGuard},
    step_page::AnalysisStepPage,
};

#[derive(Clone, Debug, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/dashboard")]
    Dashboard,
    #[at("/analysis/:analysis_id/step/:step")]
    AnalysisStep { analysis_id: String, step: String },
    #[not_found]
    #[at("/404")]
    NotFound,
}

impl Route {
    pub fn analysis_step(analysis_id: &str, step: u8) -> Self {
        Route::AnalysisStep {
            analysis_id: analysis_id.to_string(),
            step: step.to_string(),
        }
    }
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::Home => {
            info!("Rendering Landing page");
            html! { <Landing /> }
        },
        Route::Dashboard => {
            info!("Rendering Dashboard page");
            html! { <Dashboard /> }
        },
        Route::AnalysisStep { analysis_id, step } => {
            info!("Rendering step {} of analysis {}", step, analysis_id);
            let requested = parse_requested_step(&step);
            html! {
                <StepRouteGuard analysis_id={analysis_id.clone()} step={step}>
                    // keyed so each step gets fresh hook state
                    <AnalysisStepPage
                        key={format!("{}-{}", analysis_id, requested)}
                        analysis_id={analysis_id.clone()}
                        step={requested}
                    />
                </StepRouteGuard>
            }
        },
        Route::NotFound => {
            info!("Rendering NotFound page");
            html! { <NotFound /> }
        },
    }
}

#[function_component(Nav)]
pub fn nav() -> Html {
    let menu_open = use_state(|| false);
    let is_scrolled = use_state(|| false);

    {
        let is_scrolled = is_scrolled.clone();
        use_effect_with_deps(move |_| {
            let listener = web_sys::window().map(|window| {
                let scroll_window = window.clone();
                let scroll_callback = Closure::wrap(Box::new(move || {
                    let scroll_y = scroll_window.scroll_y().unwrap_or(0.0);
                    is_scrolled.set(scroll_y > 80.0);
                }) as Box<dyn FnMut()>);
                let _ = window.add_event_listener_with_callback(
                    "scroll",
                    scroll_callback.as_ref().unchecked_ref(),
                );
                (window, scroll_callback)
            });

            move || {
                if let Some((window, scroll_callback)) = listener {
                    let _ = window.remove_event_listener_with_callback(
                        "scroll",
                        scroll_callback.as_ref().unchecked_ref(),
                    );
                }
            }
        }, ());
    }

    let toggle_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            menu_open.set(!*menu_open);
        })
    };

    let close_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| menu_open.set(false))
    };

    let menu_class = if *menu_open {
        "nav-right mobile-menu-open"
    } else {
        "nav-right"
    };

    html! {
        <nav class={classes!("top-nav", (*is_scrolled).then(|| "scrolled"))}>
            <div class="nav-content">
                <Link<Route> to={Route::Home} classes="nav-logo">
                    {"reportwise"}
                </Link<Route>>
                <button class="burger-menu" onclick={toggle_menu}>
                    <span></span>
                    <span></span>
                    <span></span>
                </button>
                <div class={menu_class} onclick={close_menu}>
                    <Link<Route> to={Route::Dashboard} classes="nav-link">
                        {"Dashboard"}
                    </Link<Route>>
                </div>
            </div>
        </nav>
    }
}

#[function_component]
fn App() -> Html {
    html! {
        <BrowserRouter>
            <Nav />
            <Switch<Route> render={switch} />
        </BrowserRouter>
    }
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(Level::Info).expect("error initializing log");

    info!("Starting application");
    yew::Renderer::<App>::new().render();
}
