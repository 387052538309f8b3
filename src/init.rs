use std::sync::Arc;

use axum::{http::Method, Router};
use chrono::{NaiveDate, TimeZone, Utc};
use surrealdb::sql::{Datetime, Thing};
use tower_cookies::CookieManagerLayer;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    database::client::Database,
    entities::{
        activity::activity_entity::{Activity, ActivityDbService, ActivityStatus},
        reward::{
            redemption_entity::RedemptionDbService,
            reward_entity::{Reward, RewardDbService},
            reward_suggestion_entity::RewardSuggestionDbService,
        },
        scoring::{
            governance_metric_entity::GovernanceMetricDbService,
            score_entry_entity::ScoreEntryDbService,
            scoring_criteria_entity::{ScoringCriteria, ScoringCriteriaDbService},
            scoring_factor_entity::{FactorOption, FactorType, ScoringFactor, ScoringFactorDbService},
        },
        user_auth::local_user_entity::{LocalUser, LocalUserDbService},
    },
    middleware::{ctx::Ctx, error::AppResult, mw_ctx::CtxState},
    routes::{activity, auth_routes, health, rewards, scoring, users},
    utils::hash::hash_password,
};

const DEMO_PASSWORD: &str = "password123";

fn system_ctx(name: &str) -> Ctx {
    Ctx::new(Ok(name.to_string()), Uuid::new_v4())
}

pub async fn run_migrations(database: &Database) -> AppResult<()> {
    let db = &database.client;
    let c = system_ctx("migrations");

    LocalUserDbService { db, ctx: &c }.mutate_db().await?;
    ActivityDbService { db, ctx: &c }.mutate_db().await?;
    RewardDbService { db, ctx: &c }.mutate_db().await?;
    RedemptionDbService { db, ctx: &c }.mutate_db().await?;
    RewardSuggestionDbService { db, ctx: &c }.mutate_db().await?;
    ScoringCriteriaDbService { db, ctx: &c }.mutate_db().await?;
    ScoringFactorDbService { db, ctx: &c }.mutate_db().await?;
    ScoreEntryDbService { db, ctx: &c }.mutate_db().await?;
    GovernanceMetricDbService { db, ctx: &c }.mutate_db().await?;
    Ok(())
}

/// Scoring criteria and factors listed by the calculator UI. Safe to run on
/// every start.
pub async fn seed_reference_data(database: &Database) -> AppResult<()> {
    let db = &database.client;
    let c = system_ctx("seed");

    let criteria_db = ScoringCriteriaDbService { db, ctx: &c };
    let criteria = [
        ("1", "Code commit", "Commit high quality code to the repository", 10, 1.0),
        ("2", "Code review", "Review code of other contributors", 5, 0.8),
        ("3", "Documentation", "Write or update project documentation", 8, 0.7),
        ("4", "Problem solving", "Fix bugs or technical issues", 15, 1.2),
        ("5", "Knowledge sharing", "Share articles or run trainings", 20, 1.5),
    ];
    for (key, category, description, base_points, weight) in criteria {
        criteria_db
            .upsert(
                key,
                ScoringCriteria {
                    id: None,
                    category: category.to_string(),
                    description: description.to_string(),
                    base_points,
                    weight,
                },
            )
            .await?;
    }

    let options = |opts: &[(&str, &str)]| {
        Some(
            opts.iter()
                .map(|(label, value)| FactorOption {
                    label: label.to_string(),
                    value: value.to_string(),
                })
                .collect::<Vec<_>>(),
        )
    };
    let factors = [
        ScoringFactor {
            id: None,
            label: "Code quality".to_string(),
            description: "Quality and maintainability of the code".to_string(),
            factor_type: FactorType::Select,
            options: options(&[("Low", "low"), ("Medium", "medium"), ("High", "high")]),
            min: None,
            max: None,
        },
        ScoringFactor {
            id: None,
            label: "Completion time".to_string(),
            description: "Time needed to finish the task".to_string(),
            factor_type: FactorType::Number,
            options: None,
            min: Some(1),
            max: Some(100),
        },
        ScoringFactor {
            id: None,
            label: "Innovation".to_string(),
            description: "How innovative the solution is".to_string(),
            factor_type: FactorType::Select,
            options: options(&[
                ("Standard", "standard"),
                ("Improved", "improved"),
                ("Innovative", "innovative"),
            ]),
            min: None,
            max: None,
        },
        ScoringFactor {
            id: None,
            label: "Collaboration".to_string(),
            description: "Whether the work helped team collaboration".to_string(),
            factor_type: FactorType::Checkbox,
            options: None,
            min: None,
            max: None,
        },
    ];
    let factor_db = ScoringFactorDbService { db, ctx: &c };
    for (idx, factor) in factors.into_iter().enumerate() {
        factor_db
            .upsert(&(idx + 1).to_string(), factor)
            .await?;
    }
    info!("->> scoring reference data ready");
    Ok(())
}

fn join_date(y: i32, m: u32, d: u32) -> Option<Datetime> {
    let date = NaiveDate::from_ymd_opt(y, m, d)?.and_hms_opt(0, 0, 0)?;
    Some(Datetime::from(Utc.from_utc_datetime(&date)))
}

/// Demo accounts, activities and rewards. Skipped when any user exists.
pub async fn create_default_data_for_dev(ctx_state: &CtxState) -> AppResult<()> {
    let db = &ctx_state.db.client;
    let c = system_ctx("create_default_data");
    let user_db = LocalUserDbService { db, ctx: &c };

    if user_db.users_len().await? > 0 {
        return Ok(());
    }

    let password = hash_password(DEMO_PASSWORD)?;
    let mut admin = LocalUser::new(
        "Admin".to_string(),
        "admin@example.com".to_string(),
        password.clone(),
    );
    admin.department = Some("Administration".to_string());
    admin.position = Some("Administrator".to_string());

    let mut zhang = LocalUser::new(
        "Zhang Ming".to_string(),
        "zhangming@example.com".to_string(),
        password.clone(),
    );
    zhang.department = Some("R&D".to_string());
    zhang.position = Some("AI researcher".to_string());
    zhang.phone = Some("13812345678".to_string());
    zhang.join_date = join_date(2022, 3, 15);
    zhang.points = 1250;
    zhang.level = 3;

    let mut li = LocalUser::new(
        "Li Hua".to_string(),
        "lihua@example.com".to_string(),
        password,
    );
    li.department = Some("Product".to_string());
    li.position = Some("Product manager".to_string());
    li.phone = Some("13987654321".to_string());
    li.join_date = join_date(2022, 1, 10);
    li.points = 980;
    li.level = 2;

    user_db.create(admin).await?;
    let zhang = user_db.create(zhang).await?;
    let li = user_db.create(li).await?;

    let activity_db = ActivityDbService { db, ctx: &c };
    let activities: [(&str, &str, i64, &Option<Thing>, ActivityStatus); 5] = [
        ("AI model optimization", "Improve the performance of the current AI model", 25, &zhang.id, ActivityStatus::Completed),
        ("Frontend update", "Update the user interface for a better experience", 15, &zhang.id, ActivityStatus::Completed),
        ("API guide", "Write API documentation for developers", 20, &zhang.id, ActivityStatus::Completed),
        ("Performance bottleneck", "Resolve a system performance bottleneck", 30, &li.id, ActivityStatus::Completed),
        ("Product planning", "Take part in product planning", 10, &li.id, ActivityStatus::Pending),
    ];
    for (title, description, points, user, status) in activities {
        activity_db
            .create(Activity {
                id: None,
                title: title.to_string(),
                description: Some(description.to_string()),
                points,
                user: user.clone(),
                status,
                completed_at: None,
                r_created: None,
                r_updated: None,
            })
            .await?;
    }

    let reward_db = RewardDbService { db, ctx: &c };
    let rewards = [
        ("Extra day off", "One extra paid day off", 500, "time"),
        ("Tech book", "Pick a technical book", 300, "learning"),
        ("Equipment upgrade", "Upgrade of your work equipment", 1000, "equipment"),
        ("Conference ticket", "Attend an industry conference", 800, "learning"),
        ("Training course", "Join a paid professional course", 600, "learning"),
    ];
    for (name, description, cost, category) in rewards {
        reward_db
            .create(Reward {
                id: None,
                name: name.to_string(),
                description: Some(description.to_string()),
                cost,
                icon: None,
                available: true,
                category: Some(category.to_string()),
                likes: 0,
                r_created: None,
                r_updated: None,
            })
            .await?;
    }
    info!("->> demo data created");
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<_> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                warn!("->> ignoring invalid CORS origin {o}");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .allow_credentials(true)
}

pub fn main_router(ctx_state: &Arc<CtxState>, config: &AppConfig) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(auth_routes::routes())
        .merge(users::routes())
        .merge(activity::routes())
        .merge(rewards::routes())
        .merge(scoring::routes())
        .with_state(ctx_state.clone())
        .layer(CookieManagerLayer::new())
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}
