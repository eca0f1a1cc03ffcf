//! Line-oriented console loop over any async reader and writer.
//!
//! Besides free-text messages the console understands a few slash
//! commands: `/help [category]`, `/image <path> [product]`, `/reset` and
//! `/quit`. Anything that reaches the store is preceded by the
//! `processing` status line.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::assistant::{Assistant, Session};

/// Run the console until `/quit` or end of input. Returns the session so
/// the caller can report on it.
pub async fn run<R, W>(assistant: &Arc<Assistant>, input: R, output: &mut W) -> std::io::Result<Session>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let messages = assistant.messages();
    let mut session = assistant.session();
    let mut lines = input.lines();
    let mut pending_image: Option<PathBuf> = None;

    output
        .write_all(format!("{}\n\n", messages.help(None)).as_bytes())
        .await?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = if let Some(path) = pending_image.take() {
            processing(assistant, output).await?;
            session.handle_image_association(line, &path).await
        } else if line == "/quit" || line == "/exit" {
            break;
        } else if line == "/reset" {
            session.reset();
            messages.status("success")
        } else if let Some(rest) = line.strip_prefix("/help") {
            let category = rest.trim();
            messages.help((!category.is_empty()).then_some(category))
        } else if let Some(rest) = line.strip_prefix("/image") {
            let mut parts = rest.trim().splitn(2, char::is_whitespace);
            match (parts.next().filter(|p| !p.is_empty()), parts.next().map(str::trim)) {
                (Some(path), Some(product)) if !product.is_empty() => {
                    processing(assistant, output).await?;
                    session.handle_image_association(product, &PathBuf::from(path)).await
                }
                (Some(path), _) => {
                    pending_image = Some(PathBuf::from(path));
                    format!("לאיזה מוצר לשייך את התמונה?\n{}", messages.status("waiting_for_input"))
                }
                (None, _) => "שימוש: /image <נתיב לקובץ> [שם מוצר]".to_string(),
            }
        } else {
            processing(assistant, output).await?;
            session.handle_user_message(line).await
        };

        output.write_all(format!("{reply}\n\n").as_bytes()).await?;
        output.flush().await?;
    }

    Ok(session)
}

async fn processing<W: AsyncWrite + Unpin>(assistant: &Assistant, output: &mut W) -> std::io::Result<()> {
    output
        .write_all(format!("{}\n", assistant.messages().status("processing")).as_bytes())
        .await?;
    output.flush().await
}
