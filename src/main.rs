use testlens::cli::{internal_error, run, user_error, UserError};

fn main() {
    if let Err(e) = run() {
        if e.downcast_ref::<UserError>().is_some() {
            user_error(&e.to_string());
        }

        // Anything else is unexpected: database failures, I/O, corruption
        let mut message = e.to_string();
        let causes: Vec<String> = e.chain().skip(1).map(|cause| cause.to_string()).collect();
        if !causes.is_empty() {
            message.push_str("\n\nCaused by:");
            for (indent, cause) in causes.iter().enumerate() {
                message.push_str(&format!("\n{:indent$}  {}", "", cause, indent = indent + 1));
            }
        }
        internal_error(&message);
    }
}
