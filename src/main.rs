use anyhow::Result;
use modal_relay::constants::{MSG_DIALOG_RESOLVED, MSG_NOTIFICATION_DISMISSED, MSG_UNKNOWN_ACTION, PROMPT_PICK_ACTION};
use modal_relay::{
    logger, Announcement, ChannelSink, Config, DialogActions, DialogContent, DialogRequest, DialogService, DialogType,
    Notification, NotificationType,
};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::args().nth(1).as_deref() == Some("--init-config") {
        return Config::generate_default_config(Config::get_default_config_path()?);
    }

    let config = Config::load()?;
    logger::init(&config.logging)?;

    let (sink, announcements) = ChannelSink::new();
    let service = Arc::new(DialogService::with_config(Arc::new(sink), config));

    let renderer = tokio::spawn(render(announcements, Arc::clone(&service)));

    run_demo(&service).await?;

    service.shutdown();
    renderer.abort();
    Ok(())
}

/// Plays the caller side: a timed notification, a confirmation dialog, a saved toast
async fn run_demo(service: &DialogService) -> Result<()> {
    service.add_notification(
        Notification::new(NotificationType::Info, "Demo started").with_display_ms(1500),
    );

    let response = service.show_dialog(
        DialogType::Question,
        "Delete?",
        DialogContent::message("The file will be removed permanently"),
        DialogActions::new()
            .action("yes", |_| {
                println!("  -> deleting file");
                Ok(())
            })
            .action("no", |_| {
                println!("  -> keeping file");
                Ok(())
            }),
    )?;

    let result = response.await?;
    println!("{}: {}", MSG_DIALOG_RESOLVED, result.action);

    let saved = service.add_notification(
        Notification::new(NotificationType::Success, "Saved")
            .with_id("n1")
            .with_display_ms(1000),
    );
    saved.dismissed().await;

    Ok(())
}

/// Line-based stand-in for a real rendering layer
///
/// Dialogs are shown one at a time and answered from stdin. Announcements keep
/// being printed while a prompt is waiting.
async fn render(mut announcements: UnboundedReceiver<Announcement>, service: Arc<DialogService>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut queue: VecDeque<DialogRequest> = VecDeque::new();
    let mut current: Option<DialogRequest> = None;
    let mut stdin_open = true;

    loop {
        if current.is_none() {
            current = queue.pop_front();
            if let Some(request) = &current {
                if stdin_open {
                    prompt(request, true);
                } else {
                    service.dismiss_dialog(&request.id);
                    current = None;
                    continue;
                }
            }
        }

        tokio::select! {
            announcement = announcements.recv() => match announcement {
                Some(Announcement::NotificationStart(notification)) => {
                    println!("🔔 [{:?}] {}", notification.kind, notification.message);
                }
                Some(Announcement::NotificationEnd(id)) => {
                    println!("{}: {}", MSG_NOTIFICATION_DISMISSED, id);
                }
                Some(Announcement::DialogOpen(request)) => queue.push_back(request),
                Some(Announcement::DialogClose(id)) => {
                    queue.retain(|request| request.id != id);
                    if current.as_ref().is_some_and(|request| request.id == id) {
                        current = None;
                    }
                }
                None => break,
            },
            line = lines.next_line(), if current.is_some() => {
                let Some(request) = current.take() else { continue };
                match line {
                    Ok(Some(line)) => {
                        let choice = line.trim();
                        if request.actions.iter().any(|action| action == choice) {
                            service.close_dialog(&request.id, choice, None);
                        } else {
                            println!("{}: '{}'", MSG_UNKNOWN_ACTION, choice);
                            prompt(&request, false);
                            current = Some(request);
                        }
                    }
                    Ok(None) | Err(_) => {
                        stdin_open = false;
                        service.dismiss_dialog(&request.id);
                    }
                }
            }
        }
    }
}

/// Print a dialog, with its title and message on first display
fn prompt(request: &DialogRequest, first: bool) {
    if first {
        println!("\n== {} ==", request.title);
        if let Some(message) = &request.content.message {
            println!("{}", message);
        }
    }
    print!("{} [{}]: ", PROMPT_PICK_ACTION, request.actions.join("/"));
    let _ = std::io::stdout().flush();
}
