//! Fallback/help responder: the terminal state when nothing resolved.

use sb_protocol::{Domain, Operation};

use crate::messages::MessageCatalog;

/// Menu of supported operations for `domain`, or for every domain.
///
/// Always non-empty. If the template store yields nothing (for example an
/// override file that blanked the help section) the menu is built from the
/// operation catalog instead.
pub fn fallback(messages: &MessageCatalog, domain: Option<Domain>) -> String {
    let menu = messages.domain_menu(domain);
    if !menu.trim().is_empty() {
        return menu;
    }

    let domains = match domain {
        Some(d) => vec![d],
        None => Domain::ALL.to_vec(),
    };
    let mut lines = vec!["פעולות זמינות:".to_string()];
    for d in domains {
        let names: Vec<&str> = Operation::in_domain(d).iter().map(|op| op.name()).collect();
        lines.push(format!("{d}: {}", names.join(", ")));
    }
    lines.join("\n")
}
