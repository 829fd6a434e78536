use yew::prelude::*;
use yew_router::prelude::*;

use crate::wizard::step_guard::{coerce_step, StepGuard};
use crate::Route;

#[derive(Clone, Debug, PartialEq)]
pub enum GuardDecision {
    Render { step: u8 },
    Redirect(Route),
}

/// Normalizes a step taken from the URL, the same way stored steps are read.
pub fn parse_requested_step(raw: &str) -> u8 {
    coerce_step(raw)
}

pub fn evaluate(
    analysis_id: &str,
    raw_step: &str,
    max_allowed_step: impl FnOnce(&str) -> u8,
) -> GuardDecision {
    if analysis_id.is_empty() {
        return GuardDecision::Redirect(Route::Dashboard);
    }
    let requested = parse_requested_step(raw_step);
    let max = max_allowed_step(analysis_id);
    if requested > max {
        GuardDecision::Redirect(Route::analysis_step(analysis_id, max))
    } else {
        GuardDecision::Render { step: requested }
    }
}

#[derive(Properties, PartialEq)]
pub struct StepRouteGuardProps {
    pub analysis_id: String,
    pub step: String,
    #[prop_or_default]
    pub children: Children,
}

#[function_component(StepRouteGuard)]
pub fn step_route_guard(props: &StepRouteGuardProps) -> Html {
    let navigator = use_navigator();
    let decision = evaluate(&props.analysis_id, &props.step, |id| {
        StepGuard::browser().max_allowed_step(id)
    });

    {
        let decision = decision.clone();
        use_effect_with_deps(
            move |decision| {
                if let GuardDecision::Redirect(target) = decision {
                    log::info!("Step locked, redirecting to {:?}", target);
                    if let Some(navigator) = navigator {
                        navigator.replace(target);
                    }
                }
                || ()
            },
            decision,
        );
    }

    match decision {
        GuardDecision::Render { .. } => html! { <>{ props.children.clone() }</> },
        GuardDecision::Redirect(_) => html! {},
    }
}
