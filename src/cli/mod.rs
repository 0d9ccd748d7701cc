//! 交互式控制台
//!
//! 基于命令语言的逐行控制台，读到 `exit` 或输入结束为止。

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use crate::error::Result;
use crate::services::command::{Command, EXIT_MESSAGE, execute, recoverable_reply};
use crate::services::report::HELP_TEXT;
use crate::services::session::{DocumentationSession, SystemMode};

const BANNER: &str = "\
============================================================
CLINICAL DOCUMENTATION SYSTEM
Offline Nurse Documentation Interface
============================================================";

/// 在进程的标准输入输出上运行控制台
pub async fn run_repl(mut session: DocumentationSession) -> Result<()> {
    let input = BufReader::new(tokio::io::stdin());
    let mut output = tokio::io::stdout();
    run(&mut session, input, &mut output).await
}

pub async fn run<R, W>(session: &mut DocumentationSession, input: R, output: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut banner = format!("{}\n{}\n", BANNER, HELP_TEXT);
    if session.mode() == SystemMode::Degraded {
        banner.push_str("\nNote generation and semantic search are unavailable (degraded mode).\n");
    }
    output.write_all(banner.as_bytes()).await?;

    let mut lines = input.lines();
    loop {
        output.write_all(b"\n> ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = match Command::parse(line) {
            Ok(Command::Exit) => {
                output.write_all(format!("{}\n", EXIT_MESSAGE).as_bytes()).await?;
                break;
            }
            Ok(command) => match execute(session, &command).await {
                Ok(reply) => reply,
                Err(e) => recoverable_reply(&e).unwrap_or_else(|| {
                    warn!("Command failed: {}", e);
                    format!("Error: {}", e)
                }),
            },
            Err(e) => recoverable_reply(&e).unwrap_or_else(|| e.to_string()),
        };

        output.write_all(format!("{}\n", reply).as_bytes()).await?;
    }

    output.flush().await?;
    info!("Console session ended with {} events", session.timeline().len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::patient::PatientInfo;

    async fn run_script(script: &str) -> (DocumentationSession, String) {
        let mut session = DocumentationSession::new(PatientInfo::new(62, "male"), None, None);
        let mut output = Vec::new();
        run(&mut session, script.as_bytes(), &mut output)
            .await
            .unwrap();
        (session, String::from_utf8(output).unwrap())
    }

    #[tokio::test]
    async fn test_console_script() {
        let (session, output) = run_script(
            "note headache after breakfast\nmed aspirin 75mg at night\n\ntimeline\nexit\nnote fever\n",
        )
        .await;

        assert!(output.starts_with(BANNER));
        assert!(output.contains("degraded mode"));
        assert!(output.contains("Symptom documented: headache"));
        assert!(output.contains("Medication documented: aspirin"));
        assert!(output.contains("PATIENT TIMELINE"));
        assert!(output.trim_end().ends_with(EXIT_MESSAGE));
        // nothing after exit is read
        assert_eq!(session.timeline().len(), 2);
    }

    #[tokio::test]
    async fn test_console_guidance_and_failures() {
        let (session, output) =
            run_script("dance\nnote all quiet\nnurse_note\nfrequency cough\n").await;

        assert!(output.contains("Unknown command 'dance'"));
        assert!(output.contains("No recognized symptom found in text."));
        assert!(output.contains("Error: "));
        assert!(output.contains("No documented instances of 'cough'"));
        assert!(session.timeline().is_empty());
    }
}
