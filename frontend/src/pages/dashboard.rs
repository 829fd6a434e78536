use chrono::Utc;
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;

use crate::region::detect_browser_region;
use crate::wizard::step_guard::StepGuard;
use crate::Route;

/// New analysis ids are the creation time in base 36, e.g. `an-lx3k9q2a`.
pub fn new_analysis_id(now_millis: i64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut n = now_millis.unsigned_abs();
    let mut out = Vec::new();
    loop {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    out.reverse();
    format!("an-{}", String::from_utf8_lossy(&out))
}

#[function_component(Dashboard)]
pub fn dashboard() -> Html {
    let navigator = use_navigator();
    let resume_id = use_state(String::new);
    let error = use_state(|| None::<String>);
    let region = detect_browser_region();

    let start_new = {
        let navigator = navigator.clone();
        Callback::from(move |_: MouseEvent| {
            let id = new_analysis_id(Utc::now().timestamp_millis());
            log::info!("Starting analysis {}", id);
            if let Some(navigator) = &navigator {
                navigator.push(&Route::analysis_step(&id, 1));
            }
        })
    };

    let on_resume_input = {
        let resume_id = resume_id.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            resume_id.set(input.value());
        })
    };

    let resume = {
        let resume_id = resume_id.clone();
        let error = error.clone();
        Callback::from(move |_: MouseEvent| {
            let id = resume_id.trim().to_string();
            if id.is_empty() {
                error.set(Some("Enter an analysis id to resume".to_string()));
                return;
            }
            error.set(None);
            let step = StepGuard::browser().max_allowed_step(&id);
            if let Some(navigator) = &navigator {
                navigator.push(&Route::analysis_step(&id, step));
            }
        })
    };

    html! {
        <div class="dashboard">
            <h1>{"Your analyses"}</h1>
            <p class="dashboard-region">{format!("Region: {}", region.code())}</p>
            <button class="primary-button" onclick={start_new}>
                {"Start a new analysis"}
            </button>
            <div class="resume-analysis">
                <input
                    type="text"
                    placeholder="Analysis id"
                    value={(*resume_id).clone()}
                    oninput={on_resume_input}
                />
                <button onclick={resume}>{"Resume"}</button>
            </div>
            if let Some(message) = &*error {
                <div class="error-message">{ message }</div>
            }
        </div>
    }
}

#[function_component(NotFound)]
pub fn not_found() -> Html {
    html! {
        <div class="not-found">
            <h1>{"Page not found"}</h1>
            <Link<Route> to={Route::Home} classes="forward-link">{"Back to home"}</Link<Route>>
        </div>
    }
}
