use log::{error, info};

use quill::{GenerationService, QuillConfig};

fn init_logging(config: &QuillConfig) -> Result<(), quill::Error>
{   let mut builder = env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    );
    if config.log_to_file
    {   std::fs::create_dir_all(&config.log_dir)?;
        let file = std::fs::OpenOptions::new()
          .create(true)
          .append(true)
          .open(config.app_log_path())?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

async fn shutdown_signal()
{   if let Err(e) = tokio::signal::ctrl_c().await
    {   error!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>>
{   let config = QuillConfig::load()?;
    init_logging(&config)?;

    let service = GenerationService::from_config(&config)?;
    let audit = service.audit().clone();
    let app = quill::server::router(service);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(
      "quill listening on {} (backend {}, model {})",
      config.bind_addr, config.backend_url, config.default_model
    );

    axum::serve(listener, app)
      .with_graceful_shutdown(shutdown_signal())
      .await?;

    audit.shutdown().await?;
    Ok(())
}
