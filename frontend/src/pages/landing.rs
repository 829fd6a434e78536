use yew::prelude::*;
use yew_router::components::Link;

use crate::components::report_preview::ReportPreview;
use crate::region::{detect_browser_region, Region};
use crate::wizard::step_page::STEP_TITLES;
use crate::Route;

fn report_price(region: Region) -> &'static str {
    match region {
        Region::Ch => "CHF 49",
        Region::Eu => "€45",
        Region::Int => "$49",
    }
}

#[function_component(Landing)]
pub fn landing() -> Html {
    let region = use_state(detect_browser_region);
    let revealed = use_state(|| false);

    // Scroll to top on first mount and start the section reveal
    {
        let revealed = revealed.clone();
        use_effect_with_deps(
            move |_| {
                if let Some(window) = web_sys::window() {
                    window.scroll_to_with_x_and_y(0.0, 0.0);
                }
                revealed.set(true);
                || ()
            },
            (),
        );
    }

    let section_class = |extra: &'static str| {
        classes!("landing-section", extra, (*revealed).then(|| "revealed"))
    };

    html! {
        <div class="landing-page">
            <style>
                {r#"
                    .landing-section {
                        opacity: 0;
                        transform: translateY(24px);
                        transition: opacity 0.8s ease-out, transform 0.8s ease-out;
                    }
                    .landing-section.revealed {
                        opacity: 1;
                        transform: translateY(0);
                    }
                    .fade-in {
                        animation: fadeIn 0.5s ease-in-out;
                    }
                    @keyframes fadeIn {
                        from { opacity: 0; }
                        to { opacity: 1; }
                    }
                "#}
            </style>
            <section class={section_class("hero")}>
                <h1>{"From idea to decision-ready report"}</h1>
                <p class="hero-subtitle">
                    {"Answer five short steps and get a structured analysis in your inbox."}
                </p>
                <Link<Route> to={Route::Dashboard} classes="hero-cta">
                    {"Start your analysis"}
                </Link<Route>>
                <ReportPreview />
            </section>

            <section class={section_class("how-it-works")}>
                <h2>{"How it works"}</h2>
                <ol class="steps-list">
                    { for STEP_TITLES.iter().map(|title| html! { <li>{ *title }</li> }) }
                </ol>
            </section>

            <section class={section_class("pricing")}>
                <h2>{"One report, one price"}</h2>
                <p class="price">{ report_price(*region) }</p>
                <p class="price-note">
                    {format!("Prices shown in {}.", region.currency())}
                </p>
            </section>

            <section class={section_class("final-cta")}>
                <h2>{"Your progress is saved as you go"}</h2>
                <p>{"Close the tab, come back later, and pick up where you left off."}</p>
                <Link<Route> to={Route::Dashboard} classes="forward-link">
                    {"Go to dashboard"}
                </Link<Route>>
            </section>
        </div>
    }
}
