use serde::{Deserialize, Serialize};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;
use yew_router::prelude::*;

use crate::config;
use crate::hooks::autosave::{use_autosave, AutosaveError, AutosaveStatus};
use crate::hooks::unload_warning::use_unload_warning;
use crate::mail::{send_report_email, ReportEmailRequest};
use crate::storage::{KeyValueStore, LocalStore};
use crate::wizard::step_guard::{StepGuard, MAX_STEP, MIN_STEP};
use crate::Route;

pub const STEP_TITLES: [&str; MAX_STEP as usize] = [
    "Describe your idea",
    "Who is it for",
    "What it costs",
    "What could go wrong",
    "Get your report",
];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StepDraft {
    pub step: u8,
    pub notes: String,
}

pub fn draft_key(analysis_id: &str, step: u8) -> String {
    format!("{}:{}:draft:{}", config::STORAGE_NAMESPACE, analysis_id, step)
}

/// Reads a stored draft back. Anything unreadable counts as no draft.
pub fn load_draft<S: KeyValueStore>(store: &S, key: &str) -> Option<StepDraft> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(draft) => Some(draft),
        Err(e) => {
            log::warn!("Ignoring unreadable draft {}: {}", key, e);
            None
        }
    }
}

/// Writes `draft` immediately, skipping the autosave delay. Used before
/// leaving a step so edits typed just before navigating are kept.
pub fn flush_draft<S: KeyValueStore>(store: &S, key: &str, draft: &StepDraft) -> Result<(), AutosaveError> {
    store.set(key, &serde_json::to_string(draft)?)?;
    Ok(())
}

/// Unlocks the step after `step` and returns where Continue should go:
/// always the next step, even if later steps were unlocked before.
pub fn continue_target<S: KeyValueStore>(guard: &StepGuard<S>, analysis_id: &str, step: u8) -> u8 {
    let unlocked = guard.unlock_next_step(analysis_id, step as i64);
    log::info!("Analysis {} unlocked up to step {}", analysis_id, unlocked);
    step.saturating_add(1).min(MAX_STEP)
}

pub fn back_target(step: u8) -> u8 {
    step.saturating_sub(1).max(MIN_STEP)
}

fn status_label(status: &AutosaveStatus) -> &'static str {
    match status {
        AutosaveStatus::Idle => "",
        AutosaveStatus::Pending => "Saving…",
        AutosaveStatus::SavedLocally | AutosaveStatus::Saved => "All changes saved",
        AutosaveStatus::Failed(_) => "Could not save your changes",
    }
}

#[derive(Properties, PartialEq)]
pub struct AnalysisStepPageProps {
    pub analysis_id: String,
    pub step: u8,
}

#[function_component(AnalysisStepPage)]
pub fn analysis_step_page(props: &AnalysisStepPageProps) -> Html {
    let navigator = use_navigator();
    let key = draft_key(&props.analysis_id, props.step);

    let draft = {
        let key = key.clone();
        let step = props.step;
        use_state(move || {
            load_draft(&LocalStore, &key).unwrap_or(StepDraft { step, notes: String::new() })
        })
    };
    let is_dirty = use_state(|| false);

    let status = use_autosave(key.clone(), (*draft).clone(), *is_dirty, None, None);
    use_unload_warning(*is_dirty);

    {
        let is_dirty = is_dirty.clone();
        use_effect_with_deps(
            move |status| {
                if matches!(status, AutosaveStatus::SavedLocally | AutosaveStatus::Saved) {
                    is_dirty.set(false);
                }
                || ()
            },
            status.clone(),
        );
    }

    let on_notes = {
        let draft = draft.clone();
        let is_dirty = is_dirty.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlTextAreaElement = e.target_unchecked_into();
            draft.set(StepDraft { step: draft.step, notes: input.value() });
            is_dirty.set(true);
        })
    };

    // Pending autosave is cancelled on unmount, so write it out first
    let flush = {
        let draft = draft.clone();
        let is_dirty = is_dirty.clone();
        move || {
            if *is_dirty {
                if let Err(e) = flush_draft(&LocalStore, &key, &draft) {
                    log::error!("Failed to save draft {} before leaving: {}", key, e);
                }
            }
        }
    };

    let on_back = {
        let navigator = navigator.clone();
        let flush = flush.clone();
        let analysis_id = props.analysis_id.clone();
        let step = props.step;
        Callback::from(move |_: MouseEvent| {
            flush();
            if let Some(navigator) = &navigator {
                navigator.push(&Route::analysis_step(&analysis_id, back_target(step)));
            }
        })
    };

    let on_continue = {
        let analysis_id = props.analysis_id.clone();
        let step = props.step;
        Callback::from(move |_: MouseEvent| {
            flush();
            let next = continue_target(&StepGuard::browser(), &analysis_id, step);
            if let Some(navigator) = &navigator {
                navigator.push(&Route::analysis_step(&analysis_id, next));
            }
        })
    };

    let title = STEP_TITLES[(props.step.clamp(MIN_STEP, MAX_STEP) - 1) as usize];

    html! {
        <div class="analysis-step">
            <p class="step-counter">{format!("Step {} of {}", props.step, MAX_STEP)}</p>
            <h1>{ title }</h1>
            <textarea
                class="step-notes"
                placeholder="Write your answer here"
                value={draft.notes.clone()}
                oninput={on_notes}
            />
            <p class="autosave-status">{ status_label(&status) }</p>
            <div class="step-actions">
                if props.step > MIN_STEP {
                    <button onclick={on_back}>{"Back"}</button>
                }
                if props.step < MAX_STEP {
                    <button class="primary-button" onclick={on_continue}>{"Continue"}</button>
                } else {
                    <SendReportForm analysis_id={props.analysis_id.clone()} />
                }
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct SendReportFormProps {
    pub analysis_id: String,
}

#[function_component(SendReportForm)]
pub fn send_report_form(props: &SendReportFormProps) -> Html {
    let email = use_state(String::new);
    let name = use_state(String::new);
    let error = use_state(|| None::<String>);
    let success = use_state(|| None::<String>);
    let is_sending = use_state(|| false);

    let on_email = {
        let email = email.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            email.set(input.value());
        })
    };

    let on_name = {
        let name = name.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            name.set(input.value());
        })
    };

    let on_submit = {
        let email = email.clone();
        let name = name.clone();
        let error = error.clone();
        let success = success.clone();
        let is_sending = is_sending.clone();
        let analysis_id = props.analysis_id.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let request = ReportEmailRequest {
                email: email.trim().to_string(),
                name: Some(name.trim().to_string()).filter(|n| !n.is_empty()),
                analysis_id: analysis_id.clone(),
                report_url: None,
            };
            let error = error.clone();
            let success = success.clone();
            let is_sending = is_sending.clone();
            is_sending.set(true);
            spawn_local(async move {
                match send_report_email(&request).await {
                    Ok(_) => {
                        error.set(None);
                        success.set(Some(format!("Report sent to {}", request.email)));
                    }
                    Err(e) => {
                        success.set(None);
                        error.set(Some(e.to_string()));
                    }
                }
                is_sending.set(false);
            });
        })
    };

    html! {
        <form class="send-report-form" onsubmit={on_submit}>
            <input type="email" placeholder="Email" value={(*email).clone()} oninput={on_email} />
            <input type="text" placeholder="Name (optional)" value={(*name).clone()} oninput={on_name} />
            <button type="submit" class="primary-button" disabled={*is_sending}>
                { if *is_sending { "Sending..." } else { "Email me the report" } }
            </button>
            if let Some(message) = &*error {
                <div class="error-message">{ message }</div>
            }
            if let Some(message) = &*success {
                <div class="success-message">{ message }</div>
            }
        </form>
    }
}
