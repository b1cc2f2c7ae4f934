//! Public content pages: home, about, services, and the matching process.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tower_sessions::Session;

use super::page_context;
use crate::filters;
use crate::middleware::OptionalSession;
use crate::models::PageContext;

// =============================================================================
// Content
// =============================================================================

/// A headline figure.
pub struct Stat {
    pub value: &'static str,
    pub label: &'static str,
}

/// A titled paragraph (features, pillars, services, steps).
pub struct Feature {
    pub title: &'static str,
    pub text: &'static str,
}

/// A numbered step of the matching process.
pub struct Step {
    pub number: &'static str,
    pub title: &'static str,
    pub text: &'static str,
}

const fn stat(value: &'static str, label: &'static str) -> Stat {
    Stat { value, label }
}

const fn feature(title: &'static str, text: &'static str) -> Feature {
    Feature { title, text }
}

pub const HOME_STATS: &[Stat] = &[
    stat("2500+", "Helper Network"),
    stat("10k+", "Active Families"),
    stat("100%", "Safety Success"),
    stat("50+", "Cities Covered"),
];

pub const HOME_FEATURES: &[Feature] = &[
    feature(
        "Strict Vetting",
        "Every helper passes identity, background, and reference checks before joining the registry.",
    ),
    feature(
        "Personalized Care",
        "Care plans shaped around routines, health needs, and the personality of each senior.",
    ),
    feature(
        "Local Presence",
        "Helpers drawn from your own neighbourhood, familiar with local hospitals and services.",
    ),
    feature(
        "Instant SOS",
        "Round-the-clock escalation when something goes wrong, with family alerted immediately.",
    ),
    feature(
        "Family Dashboard",
        "Follow every visit, request, and review from one place wherever you live.",
    ),
    feature(
        "Admin Monitoring",
        "Our operations team audits engagements and helper performance continuously.",
    ),
];

pub const ABOUT_PILLARS: &[Feature] = &[
    feature(
        "Precision Vetting",
        "Identity verification, background screening, and in-person interviews for every specialist.",
    ),
    feature(
        "Compassion Match",
        "We pair seniors with helpers by temperament and language as well as skill.",
    ),
    feature(
        "Structural Safety",
        "Logged visits, family visibility, and escalation paths built into every engagement.",
    ),
];

pub const ABOUT_STATS: &[Stat] = &[
    stat("2500+", "Helper Network"),
    stat("45+", "Neighborhoods"),
    stat("100%", "Verification"),
    stat("10k+", "Families"),
];

pub const SERVICES: &[Feature] = &[
    feature(
        "Assisted Living",
        "Daily living support at home: bathing, dressing, meals, and medication reminders.",
    ),
    feature(
        "Travel Escorts",
        "Accompanied travel to appointments, family events, and pilgrimages.",
    ),
    feature(
        "24/7 SOS Response",
        "A responder on call at any hour, with family and emergency services looped in.",
    ),
    feature(
        "Wellness Checks",
        "Scheduled visits to check vitals, mood, and the safety of the home.",
    ),
    feature(
        "Cognitive Care",
        "Patient, trained companionship for seniors living with memory loss or dementia.",
    ),
    feature(
        "Post-Surg Support",
        "Recovery care after hospital discharge, following the doctor's plan.",
    ),
    feature(
        "Nutritional Support",
        "Meal planning and cooking suited to medical diets and personal taste.",
    ),
    feature(
        "Physical Therapy",
        "Guided mobility exercises from certified physiotherapy assistants.",
    ),
    feature(
        "Social Companion",
        "Conversation, walks, and outings that keep loneliness at bay.",
    ),
];

pub const VETTING_PROTOCOL: &[Feature] = &[
    feature(
        "Verification",
        "Aadhaar identity checks and document review for every applicant.",
    ),
    feature(
        "Behavioral",
        "Structured interviews and reference calls that assess temperament.",
    ),
    feature(
        "Monitoring",
        "Ongoing review of client audits and engagement logs.",
    ),
];

pub const PROCESS_STEPS: &[Step] = &[
    Step {
        number: "01",
        title: "Define Your Needs",
        text: "Tell us about the senior, their routine, and the support they need.",
    },
    Step {
        number: "02",
        title: "Curated Matching",
        text: "We shortlist verified helpers by specialty, location, and temperament.",
    },
    Step {
        number: "03",
        title: "Verified Connection",
        text: "Review dossiers and request the specialist who fits best.",
    },
    Step {
        number: "04",
        title: "Meet & Engage",
        text: "Care begins, with every visit visible on your family dashboard.",
    },
];

pub const PROCESS_FEATURES: &[Feature] = &[
    feature(
        "Structural Logs",
        "Every engagement leaves a dated record for the family and our auditors.",
    ),
    feature(
        "Circle of Care",
        "Family members stay informed without needing to be in the same city.",
    ),
    feature(
        "Quality Audits",
        "Client reviews feed directly into each helper's performance rating.",
    ),
];

// =============================================================================
// Templates
// =============================================================================

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub stats: &'static [Stat],
    pub features: &'static [Feature],
}

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate {
    pub page: PageContext,
    pub pillars: &'static [Feature],
    pub stats: &'static [Stat],
}

/// Services page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/services.html")]
pub struct ServicesTemplate {
    pub page: PageContext,
    pub services: &'static [Feature],
    pub protocol: &'static [Feature],
}

/// How-it-works page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/how_it_works.html")]
pub struct HowItWorksTemplate {
    pub page: PageContext,
    pub steps: &'static [Step],
    pub features: &'static [Feature],
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the home page.
pub async fn home(viewer: OptionalSession, session: Session) -> impl IntoResponse {
    HomeTemplate {
        page: page_context(&session, viewer.user(), "/").await,
        stats: HOME_STATS,
        features: HOME_FEATURES,
    }
}

/// Display the about page.
pub async fn about(viewer: OptionalSession, session: Session) -> impl IntoResponse {
    AboutTemplate {
        page: page_context(&session, viewer.user(), "/about").await,
        pillars: ABOUT_PILLARS,
        stats: ABOUT_STATS,
    }
}

/// Display the services page.
pub async fn services(viewer: OptionalSession, session: Session) -> impl IntoResponse {
    ServicesTemplate {
        page: page_context(&session, viewer.user(), "/services").await,
        services: SERVICES,
        protocol: VETTING_PROTOCOL,
    }
}

/// Display the how-it-works page.
pub async fn how_it_works(viewer: OptionalSession, session: Session) -> impl IntoResponse {
    HowItWorksTemplate {
        page: page_context(&session, viewer.user(), "/how-it-works").await,
        steps: PROCESS_STEPS,
        features: PROCESS_FEATURES,
    }
}
