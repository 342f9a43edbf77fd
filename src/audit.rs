//! Append-only audit log of every generation.
//!
//! A single task owns the log file and performs every append, so
//! concurrent callers never interleave partial lines.

use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use log::{debug, trace, error, info};

use crate::error::Error;
use crate::request::AuditRecord;

pub type AppendReply = Result<(), Error>;

/// Commands for the audit actor
pub enum AuditCommand
{   Append
    {   record: AuditRecord
      , reply: mpsc::UnboundedSender<AppendReply>
    }
  , Shutdown
    {   reply: mpsc::UnboundedSender<()>
    }
}

/// Audit actor state
struct AuditState
{   path: PathBuf
  , file: Option<tokio::fs::File>
  , written: usize
}

impl AuditState
{   fn new(path: PathBuf) -> Self
    {   AuditState
        {   path
          , file: None
          , written: 0
        }
    }

    async fn open(&mut self) -> Result<&mut tokio::fs::File, Error>
    {   if self.file.is_none()
        {   if let Some(dir) = self.path.parent()
            {   if !dir.as_os_str().is_empty()
                {   tokio::fs::create_dir_all(dir).await?;
                }
            }
            debug!("Opening audit log {}", self.path.display());
            let file = tokio::fs::OpenOptions::new()
              .create(true)
              .append(true)
              .open(&self.path)
              .await?;
            self.file = Some(file);
        }
        self.file.as_mut().ok_or(Error::AuditUnavailable)
    }

    async fn handle_append(&mut self, record: &AuditRecord)
      -> Result<(), Error>
    {   let mut line = serde_json::to_string(record)
          .map_err(|e| Error::Other(e.to_string()))?;
        line.push('\n');
        trace!("Audit line: {}", line.trim_end());

        let file = self.open().await?;
        let result = match file.write_all(line.as_bytes()).await
        {   Ok(()) => file.flush().await
          , Err(e) => Err(e)
        };

        match result
        {   Ok(()) => {
              self.written += 1;
              Ok(())
            }
          , Err(e) => {
              error!(
                "Audit write to {} failed: {}",
                self.path.display(), e
              );
              // Reopen on the next append
              self.file = None;
              Err(e.into())
            }
        }
    }
}

/// Public audit log handle, cheap to clone
#[derive(Clone)]
pub struct AuditLog
{   tx: mpsc::UnboundedSender<AuditCommand>
  , path: PathBuf
}

impl AuditLog
{   /// Spawn the audit actor writing to `path`.
    /// Must be called inside a tokio runtime.
    pub fn spawn(path: impl Into<PathBuf>) -> Self
    {   let path = path.into();
        debug!("Creating AuditLog at {}", path.display());
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();

        let task_path = path.clone();
        tokio::spawn(async move {
          run_audit_loop(cmd_rx, task_path).await;
        });

        AuditLog
        {   tx: cmd_tx
          , path
        }
    }

    pub fn path(&self) -> &Path
    {   &self.path
    }

    /// Append one record and wait until it is written
    pub async fn record(&self, record: AuditRecord)
      -> Result<(), Error>
    {   let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();

        self.tx.send(AuditCommand::Append {
          record,
          reply: reply_tx,
        }).map_err(|_| {
          error!("Audit logger disconnected");
          Error::AuditUnavailable
        })?;

        reply_rx.recv().await.unwrap_or(Err(Error::AuditUnavailable))
    }

    /// Stop the actor after pending appends are written
    pub async fn shutdown(&self) -> Result<(), Error>
    {   debug!("Shutting down AuditLog");
        let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();
        self.tx.send(AuditCommand::Shutdown { reply: reply_tx })
          .map_err(|_| Error::AuditUnavailable)?;
        reply_rx.recv().await.ok_or(Error::AuditUnavailable)
    }
}

/// Main audit event loop
async fn run_audit_loop(
  mut cmd_rx: mpsc::UnboundedReceiver<AuditCommand>
, path: PathBuf
)
{   debug!("Starting audit loop");
    let mut state = AuditState::new(path);

    loop
    { match cmd_rx.recv().await
      {   Some(AuditCommand::Append { record, reply }) => {
            let result = state.handle_append(&record).await;
            let _ = reply.send(result);
          }
        , Some(AuditCommand::Shutdown { reply }) => {
            info!(
              "Audit logger shutting down after {} records",
              state.written
            );
            let _ = reply.send(());
            break;
          }
        , None => {
            debug!("Audit channel closed");
            break;
          }
      }
    }
}

/// Read every record back from an audit log file
pub async fn read_records(path: impl AsRef<Path>)
  -> Result<Vec<AuditRecord>, Error>
{   let text = tokio::fs::read_to_string(path.as_ref()).await?;
    text.lines()
      .filter(|line| !line.trim().is_empty())
      .map(|line| {
        serde_json::from_str(line)
          .map_err(|e| Error::ParseError(e.to_string()))
      })
      .collect()
}
