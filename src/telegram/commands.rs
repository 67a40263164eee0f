use crate::withdrawal::{WithdrawalRequest, WithdrawalStatus};

/// A moderation decision typed into the admin chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModerationCommand {
    pub id: i64,
    pub status: WithdrawalStatus,
}

/// Parses `/approve_<id>` and `/reject_<id>`. Anything else is not a command.
pub fn parse_command(text: &str) -> Option<ModerationCommand> {
    let text = text.trim();
    let (status, rest) = if let Some(rest) = text.strip_prefix("/approve_") {
        (WithdrawalStatus::Approved, rest)
    } else if let Some(rest) = text.strip_prefix("/reject_") {
        (WithdrawalStatus::Rejected, rest)
    } else {
        return None;
    };

    // Group chats append the bot name: /approve_12@payout_bot
    let id = rest.split('@').next()?.parse::<i64>().ok()?;
    Some(ModerationCommand { id, status })
}

/// Messages are sent with `parse_mode=HTML`.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn new_request_alert(request: &WithdrawalRequest) -> String {
    format!(
        "🔔 <b>New withdrawal request #{id}</b>\n\n\
         👤 User: {name}\n\
         📧 Email: {email}\n\
         💰 Amount: {amount}₽\n\
         📱 Destination: {destination}\n\
         🏦 Bank: {bank}\n\n\
         /approve_{id} - approve\n\
         /reject_{id} - reject",
        id = request.id,
        name = escape_html(&request.user_name),
        email = escape_html(&request.user_email),
        amount = request.amount,
        destination = escape_html(&request.destination),
        bank = escape_html(&request.bank_name),
    )
}

pub fn decision_reply(request: &WithdrawalRequest) -> String {
    let (marker, verb) = match request.status {
        WithdrawalStatus::Approved => ("✅", "approved"),
        WithdrawalStatus::Rejected => ("❌", "rejected"),
        WithdrawalStatus::Pending => ("⏳", "pending"),
    };

    format!(
        "{marker} <b>Request #{id} {verb}</b>\n\n👤 {name}\n💰 {amount}₽ → {masked} ({bank})",
        marker = marker,
        id = request.id,
        verb = verb,
        name = escape_html(&request.user_name),
        amount = request.amount,
        masked = escape_html(&request.masked_destination()),
        bank = escape_html(&request.bank_name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn request(status: WithdrawalStatus) -> WithdrawalRequest {
        WithdrawalRequest {
            id: 12,
            user_name: "Oleg".to_string(),
            user_email: "oleg@example.com".to_string(),
            amount: Decimal::from(750),
            destination: "4276123456789012".to_string(),
            bank_name: "Тинькофф".to_string(),
            status,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn parses_decisions() {
        assert_eq!(
            parse_command("/approve_12"),
            Some(ModerationCommand { id: 12, status: WithdrawalStatus::Approved })
        );
        assert_eq!(
            parse_command(" /reject_7@payout_bot "),
            Some(ModerationCommand { id: 7, status: WithdrawalStatus::Rejected })
        );
    }

    #[test]
    fn ignores_other_text() {
        assert_eq!(parse_command("/start"), None);
        assert_eq!(parse_command("/approve_"), None);
        assert_eq!(parse_command("/approve_abc"), None);
        assert_eq!(parse_command("approve_12"), None);
    }

    #[test]
    fn alert_lists_commands_for_the_request() {
        let text = new_request_alert(&request(WithdrawalStatus::Pending));
        assert!(text.contains("#12"));
        assert!(text.contains("/approve_12"));
        assert!(text.contains("/reject_12"));
        assert!(text.contains("4276123456789012"));
    }

    #[test]
    fn user_text_is_escaped() {
        let mut withdrawal = request(WithdrawalStatus::Pending);
        withdrawal.user_name = "<b>Oleg</b> & co".to_string();
        let text = new_request_alert(&withdrawal);
        assert!(text.contains("&lt;b&gt;Oleg&lt;/b&gt; &amp; co"));
    }

    #[test]
    fn reply_masks_destination() {
        let text = decision_reply(&request(WithdrawalStatus::Rejected));
        assert!(text.starts_with("❌"));
        assert!(text.contains("*9012"));
        assert!(!text.contains("4276123456789012"));
    }
}
