// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Atelier server binary.

use anyhow::Context;
use atelier_server::{create_app_state, create_router, ServerConfig};
use atelier_server_auth::AccessToken;
use atelier_server_config::LogFormat;
use atelier_server_db::{NewUser, PoolSettings, UserRepository};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Atelier server - project management API.
#[derive(Parser, Debug)]
#[command(name = "atelier-server", about = "Atelier project management server", version)]
struct Args {
	/// Configuration file layered over the defaults and under the environment
	#[arg(long, global = true, env = "ATELIER_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Run the HTTP server (default)
	Serve,
	/// Show version information
	Version,
	/// Create a user account
	CreateUser {
		#[arg(long)]
		email: String,
		#[arg(long)]
		first_name: String,
		#[arg(long)]
		last_name: String,
		/// Grant access to every project
		#[arg(long)]
		superuser: bool,
	},
	/// Issue an access token for an existing user and print it once
	IssueToken {
		#[arg(long)]
		email: String,
		/// Overrides `auth.token_ttl_days`
		#[arg(long)]
		ttl_days: Option<i64>,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("atelier-server {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => atelier_server_config::load_config_with_file(path.clone())?,
		None => atelier_server_config::load_config()?,
	};

	init_tracing(&config);

	let pool = atelier_server_db::create_pool_with(
		&config.database.url,
		PoolSettings {
			max_connections: config.database.max_connections,
			busy_timeout: config.database.busy_timeout,
		},
	)
	.await?;
	atelier_server_db::run_migrations(&pool).await?;

	match args.command {
		Some(Command::CreateUser {
			email,
			first_name,
			last_name,
			superuser,
		}) => {
			create_user(
				&UserRepository::new(pool),
				NewUser {
					email,
					first_name,
					last_name,
					is_superuser: superuser,
					..Default::default()
				},
			)
			.await?;
			Ok(())
		}
		Some(Command::IssueToken { email, ttl_days }) => {
			let ttl_days = ttl_days.unwrap_or(config.auth.token_ttl_days);
			issue_token(&UserRepository::new(pool), &email, ttl_days).await?;
			Ok(())
		}
		Some(Command::Serve) | Some(Command::Version) | None => serve(pool, &config).await,
	}
}

fn init_tracing(config: &ServerConfig) {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());

	match config.logging.format {
		LogFormat::Json => tracing_subscriber::registry()
			.with(filter)
			.with(tracing_subscriber::fmt::layer().json())
			.init(),
		LogFormat::Pretty => tracing_subscriber::registry()
			.with(filter)
			.with(tracing_subscriber::fmt::layer())
			.init(),
	}
}

async fn serve(
	pool: sqlx::SqlitePool,
	config: &ServerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		media_dir = %config.paths.media_dir.display(),
		"starting atelier-server"
	);

	tokio::fs::create_dir_all(&config.paths.media_dir).await?;

	let state = create_app_state(pool, config).await;
	let app = create_router(state)
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		);

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}

async fn create_user(users: &UserRepository, new_user: NewUser) -> anyhow::Result<()> {
	let user = users
		.create_user(&new_user)
		.await
		.with_context(|| format!("failed to create user {}", new_user.email))?;

	println!("created user {} ({})", user.email, user.id);
	Ok(())
}

async fn issue_token(users: &UserRepository, email: &str, ttl_days: i64) -> anyhow::Result<()> {
	let user = users
		.get_user_by_email(email)
		.await
		.context("failed to look up user")?
		.with_context(|| format!("no user with email {email}"))?;

	let (token, raw) = AccessToken::new(user.id, "cli", ttl_days);
	users
		.create_access_token(&token)
		.await
		.context("failed to store access token")?;

	tracing::info!(user_id = %user.id, token_id = %token.id, "access token issued");
	println!("{raw}");
	Ok(())
}
