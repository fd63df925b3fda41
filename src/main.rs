//! Order Orchestration Core — Rust + Actix-Web + SeaORM + PostgreSQL
//!
//! Composes four independent engines behind one Order Lifecycle Controller:
//! - Recipe Inventory Deductor (recipe-graph expansion, atomic deduction)
//! - Pricing Rule Engine (conflict-resolving discount evaluation)
//! - Priority Scorer (weighted, curve-shaped order scoring)
//! - Queue Sequencer & Rebalancer (fairness-driven admission and resequencing)

mod config;
mod context;
mod db;
mod entity;
mod errors;
mod handlers;
mod models;
mod services;
mod workers;

use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::context::CoreContext;
use crate::handlers::{
    configure_inventory, configure_orders, configure_pricing, configure_queues,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,order_core=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Order Orchestration Core");

    let config = Config::from_env().expect("Failed to load configuration");

    let bind_address = format!("{}:{}", config.host, config.port);
    let cors_origin = config.cors_origin.clone();

    let db = db::establish_connection(&config)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Running database migrations...");
    use sea_orm::{ConnectionTrait, Statement};

    let migrations: &[&str] = &[
        // ── Tenancy root ─────────────────────────────────────────────────────
        r#"
        CREATE TABLE IF NOT EXISTS restaurants (
            id                              BIGSERIAL PRIMARY KEY,
            name                            TEXT NOT NULL,
            default_conflict_resolution     TEXT NOT NULL DEFAULT 'highest_discount',
            use_recipe_based_deduction      BOOLEAN NOT NULL DEFAULT TRUE,
            deduct_on_completion            BOOLEAN NOT NULL DEFAULT FALSE,
            auto_reverse_on_cancellation     BOOLEAN NOT NULL DEFAULT TRUE,
            allow_partial_fulfillment       BOOLEAN NOT NULL DEFAULT TRUE,
            allow_negative_inventory        BOOLEAN NOT NULL DEFAULT FALSE,
            low_stock_warning_threshold_pct NUMERIC(5,2) NOT NULL DEFAULT 20,
            max_sub_recipe_depth            INTEGER NOT NULL DEFAULT 8,
            max_batch_size                  INTEGER NOT NULL DEFAULT 200,
            created_at                      TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS customers (
            id              BIGSERIAL PRIMARY KEY,
            restaurant_id   BIGINT NOT NULL REFERENCES restaurants(id) ON DELETE CASCADE,
            name            TEXT,
            loyalty_tier    TEXT,
            loyalty_points  INTEGER NOT NULL DEFAULT 0,
            is_vip          BOOLEAN NOT NULL DEFAULT FALSE,
            orders_count    INTEGER NOT NULL DEFAULT 0,
            tags_csv        TEXT NOT NULL DEFAULT '',
            birthday_month  SMALLINT,
            created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        CREATE INDEX IF NOT EXISTS idx_customers_restaurant ON customers(restaurant_id);
        "#,

        // ── Menu / order surface ─────────────────────────────────────────────
        r#"
        CREATE TABLE IF NOT EXISTS menu_items (
            id                BIGSERIAL PRIMARY KEY,
            restaurant_id     BIGINT NOT NULL REFERENCES restaurants(id) ON DELETE CASCADE,
            name              TEXT NOT NULL,
            price             NUMERIC(12,2) NOT NULL,
            complexity_score  NUMERIC(6,2) NOT NULL DEFAULT 1,
            category_id       TEXT,
            is_active         BOOLEAN NOT NULL DEFAULT TRUE
        );
        CREATE INDEX IF NOT EXISTS idx_menu_items_restaurant ON menu_items(restaurant_id);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            id                  BIGSERIAL PRIMARY KEY,
            restaurant_id       BIGINT NOT NULL REFERENCES restaurants(id) ON DELETE RESTRICT,
            customer_id         BIGINT REFERENCES customers(id) ON DELETE SET NULL,
            status              TEXT NOT NULL DEFAULT 'pending',
            channel             TEXT,
            order_type          TEXT,
            payment_method      TEXT,
            special_instructions TEXT,
            party_size          INTEGER NOT NULL DEFAULT 1,
            subtotal            NUMERIC(12,2) NOT NULL DEFAULT 0,
            discount_total      NUMERIC(12,2) NOT NULL DEFAULT 0,
            total               NUMERIC(12,2) NOT NULL DEFAULT 0,
            promised_at         TIMESTAMPTZ,
            pricing_evaluated   BOOLEAN NOT NULL DEFAULT FALSE,
            created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        CREATE INDEX IF NOT EXISTS idx_orders_restaurant ON orders(restaurant_id);
        CREATE INDEX IF NOT EXISTS idx_orders_customer   ON orders(customer_id);
        CREATE INDEX IF NOT EXISTS idx_orders_status     ON orders(status);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS order_items (
            id            BIGSERIAL PRIMARY KEY,
            order_id      BIGINT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
            menu_item_id  BIGINT NOT NULL REFERENCES menu_items(id) ON DELETE RESTRICT,
            quantity      NUMERIC(10,3) NOT NULL,
            unit_price    NUMERIC(12,2) NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id);
        "#,

        // ── Recipe Inventory Deductor (C1) ───────────────────────────────────
        r#"
        CREATE TABLE IF NOT EXISTS inventory (
            id                   BIGSERIAL PRIMARY KEY,
            restaurant_id        BIGINT NOT NULL REFERENCES restaurants(id) ON DELETE CASCADE,
            name                 TEXT NOT NULL,
            quantity             NUMERIC(14,3) NOT NULL,
            unit                 TEXT NOT NULL,
            low_stock_threshold  NUMERIC(14,3) NOT NULL DEFAULT 0,
            deleted_at           TIMESTAMPTZ
        );
        CREATE INDEX IF NOT EXISTS idx_inventory_restaurant ON inventory(restaurant_id);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS inventory_adjustments (
            id                BIGSERIAL PRIMARY KEY,
            inventory_id      BIGINT NOT NULL REFERENCES inventory(id) ON DELETE RESTRICT,
            kind              TEXT NOT NULL,
            quantity_before   NUMERIC(14,3) NOT NULL,
            quantity_change   NUMERIC(14,3) NOT NULL,
            quantity_after    NUMERIC(14,3) NOT NULL,
            reason            TEXT,
            reference_kind    TEXT NOT NULL,
            reference_id      BIGINT,
            actor_id          BIGINT,
            metadata          JSONB NOT NULL DEFAULT '{}',
            created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        CREATE INDEX IF NOT EXISTS idx_inventory_adjustments_inventory ON inventory_adjustments(inventory_id);
        CREATE INDEX IF NOT EXISTS idx_inventory_adjustments_reference
            ON inventory_adjustments(reference_kind, reference_id);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS recipes (
            id            BIGSERIAL PRIMARY KEY,
            menu_item_id  BIGINT NOT NULL UNIQUE REFERENCES menu_items(id) ON DELETE CASCADE,
            name          TEXT NOT NULL,
            deleted_at    TIMESTAMPTZ
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS recipe_ingredients (
            id              BIGSERIAL PRIMARY KEY,
            recipe_id       BIGINT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            inventory_id    BIGINT NOT NULL REFERENCES inventory(id) ON DELETE RESTRICT,
            quantity        NUMERIC(14,3) NOT NULL,
            unit            TEXT NOT NULL,
            is_optional     BOOLEAN NOT NULL DEFAULT FALSE,
            is_active       BOOLEAN NOT NULL DEFAULT TRUE,
            display_order   INTEGER NOT NULL DEFAULT 0,
            UNIQUE(recipe_id, inventory_id)
        );
        CREATE INDEX IF NOT EXISTS idx_recipe_ingredients_recipe ON recipe_ingredients(recipe_id);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS recipe_sub_recipes (
            id                BIGSERIAL PRIMARY KEY,
            parent_recipe_id  BIGINT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            child_recipe_id   BIGINT NOT NULL REFERENCES recipes(id) ON DELETE RESTRICT,
            multiplier        NUMERIC(10,3) NOT NULL DEFAULT 1,
            is_active         BOOLEAN NOT NULL DEFAULT TRUE,
            UNIQUE(parent_recipe_id, child_recipe_id)
        );
        CREATE INDEX IF NOT EXISTS idx_recipe_sub_recipes_parent ON recipe_sub_recipes(parent_recipe_id);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS menu_item_inventory (
            id                BIGSERIAL PRIMARY KEY,
            menu_item_id      BIGINT NOT NULL REFERENCES menu_items(id) ON DELETE CASCADE,
            inventory_id      BIGINT NOT NULL REFERENCES inventory(id) ON DELETE RESTRICT,
            quantity_per_item NUMERIC(14,3) NOT NULL,
            UNIQUE(menu_item_id, inventory_id)
        );
        "#,

        // ── Pricing Rule Engine (C2) ──────────────────────────────────────────
        r#"
        CREATE TABLE IF NOT EXISTS pricing_rules (
            rule_id                 TEXT PRIMARY KEY,
            restaurant_id           BIGINT NOT NULL REFERENCES restaurants(id) ON DELETE CASCADE,
            name                    TEXT NOT NULL,
            rule_type               TEXT NOT NULL,
            status                  TEXT NOT NULL DEFAULT 'active',
            priority                SMALLINT NOT NULL DEFAULT 3,
            discount_value          NUMERIC(10,2) NOT NULL,
            max_discount_amount     NUMERIC(12,2),
            min_order_amount        NUMERIC(12,2) NOT NULL DEFAULT 0,
            conditions              JSONB NOT NULL DEFAULT '{}',
            valid_from              TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            valid_until             TIMESTAMPTZ,
            max_uses                INTEGER,
            current_uses            INTEGER NOT NULL DEFAULT 0,
            max_uses_per_customer   INTEGER,
            stackable               BOOLEAN NOT NULL DEFAULT FALSE,
            excluded_rule_ids       JSONB NOT NULL DEFAULT '[]',
            conflict_resolution     TEXT,
            promo_code              TEXT,
            created_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at              TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        CREATE INDEX IF NOT EXISTS idx_pricing_rules_restaurant ON pricing_rules(restaurant_id);
        CREATE INDEX IF NOT EXISTS idx_pricing_rules_status     ON pricing_rules(status);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS pricing_rule_applications (
            id                BIGSERIAL PRIMARY KEY,
            rule_id           TEXT NOT NULL REFERENCES pricing_rules(rule_id) ON DELETE RESTRICT,
            order_id          BIGINT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
            customer_id       BIGINT,
            discount_amount   NUMERIC(12,2) NOT NULL,
            original_amount   NUMERIC(12,2) NOT NULL,
            final_amount      NUMERIC(12,2) NOT NULL,
            conditions_met    JSONB NOT NULL DEFAULT '{}',
            provenance        TEXT NOT NULL DEFAULT 'system',
            created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        CREATE INDEX IF NOT EXISTS idx_pricing_rule_applications_order ON pricing_rule_applications(order_id);
        CREATE INDEX IF NOT EXISTS idx_pricing_rule_applications_rule  ON pricing_rule_applications(rule_id);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS pricing_rule_metrics (
            id                  BIGSERIAL PRIMARY KEY,
            rule_id             TEXT NOT NULL REFERENCES pricing_rules(rule_id) ON DELETE CASCADE,
            date                DATE NOT NULL,
            evaluated_count     INTEGER NOT NULL DEFAULT 0,
            applied_count       INTEGER NOT NULL DEFAULT 0,
            skipped_count       INTEGER NOT NULL DEFAULT 0,
            conflicts_resolved  INTEGER NOT NULL DEFAULT 0,
            stacking_count      INTEGER NOT NULL DEFAULT 0,
            total_discount      NUMERIC(14,2) NOT NULL DEFAULT 0,
            distinct_customers  INTEGER NOT NULL DEFAULT 0,
            UNIQUE(rule_id, date)
        );
        "#,

        // ── Priority Scorer (C3) ──────────────────────────────────────────────
        r#"
        CREATE TABLE IF NOT EXISTS priority_rules (
            id              BIGSERIAL PRIMARY KEY,
            restaurant_id   BIGINT NOT NULL REFERENCES restaurants(id) ON DELETE CASCADE,
            name            TEXT NOT NULL,
            score_type      TEXT NOT NULL,
            score_config    JSONB NOT NULL DEFAULT '{}',
            default_weight  DOUBLE PRECISION NOT NULL DEFAULT 1,
            min_score       DOUBLE PRECISION NOT NULL DEFAULT 0,
            max_score       DOUBLE PRECISION NOT NULL DEFAULT 100,
            is_active       BOOLEAN NOT NULL DEFAULT TRUE
        );
        CREATE INDEX IF NOT EXISTS idx_priority_rules_restaurant ON priority_rules(restaurant_id);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS priority_profiles (
            id                         BIGSERIAL PRIMARY KEY,
            restaurant_id              BIGINT NOT NULL REFERENCES restaurants(id) ON DELETE CASCADE,
            name                       TEXT NOT NULL,
            aggregation_method         TEXT NOT NULL DEFAULT 'weighted_sum',
            total_weight_normalization BOOLEAN NOT NULL DEFAULT FALSE,
            min_total_score            DOUBLE PRECISION NOT NULL DEFAULT 0,
            max_total_score            DOUBLE PRECISION NOT NULL DEFAULT 100,
            is_active                  BOOLEAN NOT NULL DEFAULT TRUE
        );
        CREATE INDEX IF NOT EXISTS idx_priority_profiles_restaurant ON priority_profiles(restaurant_id);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS priority_profile_rules (
            id               BIGSERIAL PRIMARY KEY,
            profile_id       BIGINT NOT NULL REFERENCES priority_profiles(id) ON DELETE CASCADE,
            rule_id          BIGINT NOT NULL REFERENCES priority_rules(id) ON DELETE CASCADE,
            weight_override  DOUBLE PRECISION,
            required         BOOLEAN NOT NULL DEFAULT FALSE,
            min_threshold    DOUBLE PRECISION,
            max_threshold    DOUBLE PRECISION,
            fallback_score   DOUBLE PRECISION,
            UNIQUE(profile_id, rule_id)
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS queue_priority_configs (
            id                     BIGSERIAL PRIMARY KEY,
            queue_id               BIGINT NOT NULL UNIQUE,
            profile_id             BIGINT NOT NULL REFERENCES priority_profiles(id) ON DELETE RESTRICT,
            is_active              BOOLEAN NOT NULL DEFAULT TRUE,
            rebalance_enabled      BOOLEAN NOT NULL DEFAULT TRUE,
            rebalance_threshold    DOUBLE PRECISION NOT NULL DEFAULT 0.3,
            max_position_change    INTEGER NOT NULL DEFAULT 3,
            boost_vip              DOUBLE PRECISION NOT NULL DEFAULT 10,
            boost_delayed          DOUBLE PRECISION NOT NULL DEFAULT 15,
            boost_large_party      DOUBLE PRECISION NOT NULL DEFAULT 5,
            peak_multiplier        DOUBLE PRECISION NOT NULL DEFAULT 1.2,
            peak_hours             JSONB NOT NULL DEFAULT '[]',
            boost_duration_seconds BIGINT NOT NULL DEFAULT 900
        );
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS order_priority_scores (
            id                  BIGSERIAL PRIMARY KEY,
            queue_item_id       BIGINT NOT NULL UNIQUE,
            profile_id          BIGINT NOT NULL REFERENCES priority_profiles(id) ON DELETE RESTRICT,
            total               DOUBLE PRECISION NOT NULL,
            base                DOUBLE PRECISION NOT NULL,
            boost               DOUBLE PRECISION NOT NULL DEFAULT 0,
            components          JSONB NOT NULL DEFAULT '[]',
            calculated_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            is_boosted          BOOLEAN NOT NULL DEFAULT FALSE,
            boost_expires_at    TIMESTAMPTZ,
            suggested_sequence  INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_order_priority_scores_boost
            ON order_priority_scores(is_boosted, boost_expires_at);
        CREATE INDEX IF NOT EXISTS idx_order_priority_scores_calculated
            ON order_priority_scores(calculated_at);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS priority_adjustment_logs (
            id              BIGSERIAL PRIMARY KEY,
            queue_item_id   BIGINT NOT NULL,
            previous_score  DOUBLE PRECISION NOT NULL,
            new_score       DOUBLE PRECISION NOT NULL,
            reason          TEXT NOT NULL,
            actor_id        BIGINT,
            created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        CREATE INDEX IF NOT EXISTS idx_priority_adjustment_logs_item ON priority_adjustment_logs(queue_item_id);
        "#,

        // ── Queue Sequencer & Rebalancer (C4) ─────────────────────────────────
        r#"
        CREATE TABLE IF NOT EXISTS order_queues (
            id                   BIGSERIAL PRIMARY KEY,
            restaurant_id        BIGINT NOT NULL REFERENCES restaurants(id) ON DELETE CASCADE,
            name                 TEXT NOT NULL,
            queue_type           TEXT NOT NULL,
            status               TEXT NOT NULL DEFAULT 'active',
            capacity             INTEGER NOT NULL DEFAULT 50,
            default_prep_time_min INTEGER NOT NULL DEFAULT 15,
            warning_sla_min      INTEGER NOT NULL DEFAULT 20,
            critical_sla_min     INTEGER NOT NULL DEFAULT 30,
            current_size         INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_order_queues_restaurant ON order_queues(restaurant_id);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS queue_items (
            id                     BIGSERIAL PRIMARY KEY,
            queue_id               BIGINT NOT NULL REFERENCES order_queues(id) ON DELETE CASCADE,
            order_id               BIGINT NOT NULL UNIQUE REFERENCES orders(id) ON DELETE CASCADE,
            sequence_number        INTEGER NOT NULL,
            priority               DOUBLE PRECISION NOT NULL DEFAULT 0,
            expedited              BOOLEAN NOT NULL DEFAULT FALSE,
            status                 TEXT NOT NULL DEFAULT 'queued',
            queued_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            started_at             TIMESTAMPTZ,
            ready_at               TIMESTAMPTZ,
            completed_at           TIMESTAMPTZ,
            hold_until             TIMESTAMPTZ,
            hold_reason            TEXT,
            estimated_ready_at     TIMESTAMPTZ,
            assigned_staff         TEXT,
            assigned_station       TEXT,
            prep_time_actual_min   DOUBLE PRECISION,
            wait_time_actual_min   DOUBLE PRECISION,
            UNIQUE(queue_id, sequence_number)
        );
        CREATE INDEX IF NOT EXISTS idx_queue_items_queue  ON queue_items(queue_id);
        CREATE INDEX IF NOT EXISTS idx_queue_items_status ON queue_items(status);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS queue_item_status_history (
            id              BIGSERIAL PRIMARY KEY,
            queue_item_id   BIGINT NOT NULL REFERENCES queue_items(id) ON DELETE CASCADE,
            old_status      TEXT,
            new_status      TEXT NOT NULL,
            reason          TEXT,
            actor_id        BIGINT,
            created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        CREATE INDEX IF NOT EXISTS idx_queue_item_status_history_item ON queue_item_status_history(queue_item_id);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS queue_sequence_rules (
            id                  BIGSERIAL PRIMARY KEY,
            queue_id            BIGINT NOT NULL REFERENCES order_queues(id) ON DELETE CASCADE,
            name                TEXT NOT NULL,
            priority            INTEGER NOT NULL DEFAULT 0,
            is_active           BOOLEAN NOT NULL DEFAULT TRUE,
            conditions          JSONB NOT NULL DEFAULT '{}',
            priority_adjustment DOUBLE PRECISION,
            position_adjustment INTEGER,
            auto_expedite       BOOLEAN NOT NULL DEFAULT FALSE,
            set_station         TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_queue_sequence_rules_queue ON queue_sequence_rules(queue_id);
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS queue_metrics (
            id                  BIGSERIAL PRIMARY KEY,
            queue_id            BIGINT NOT NULL REFERENCES order_queues(id) ON DELETE CASCADE,
            date                DATE NOT NULL,
            hour                SMALLINT NOT NULL,
            items_admitted      INTEGER NOT NULL DEFAULT 0,
            items_completed     INTEGER NOT NULL DEFAULT 0,
            items_cancelled     INTEGER NOT NULL DEFAULT 0,
            avg_wait_time_min   DOUBLE PRECISION,
            avg_prep_time_min   DOUBLE PRECISION,
            UNIQUE(queue_id, date, hour)
        );
        "#,
    ];

    for sql in migrations {
        db.execute(Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            sql.to_string(),
        ))
        .await
        .expect("Failed to run migration");
    }

    tracing::info!("All {} migrations complete", migrations.len());

    let ctx = CoreContext::new(db);

    tokio::spawn(workers::run_rebalancer(ctx.clone(), config.rebalance_interval_minutes));
    tokio::spawn(workers::run_boost_expirer(ctx.clone()));
    tokio::spawn(workers::run_stale_score_recomputer(ctx.clone()));
    tokio::spawn(workers::run_rule_housekeeper(ctx.clone()));

    tracing::info!("Server starting on {}", bind_address);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(web::JsonConfig::default().limit(2 * 1024 * 1024))
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(web::Data::new(ctx.clone()))
            .configure(configure_orders)
            .configure(configure_queues)
            .configure(configure_pricing)
            .configure(configure_inventory)
            .route(
                "/health",
                web::get().to(|| async {
                    actix_web::HttpResponse::Ok().json(serde_json::json!({
                        "status": "healthy",
                        "service": "order-orchestration-core"
                    }))
                }),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
