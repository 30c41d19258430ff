use super::Mail;
use crate::swaps::repo_types::SwapStatus;

const BRAND: &str = "Skill Swap";

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn signup_otp(to: &str, otp: &str, ttl_minutes: i64) -> Mail {
    Mail {
        to: to.into(),
        subject: format!("{BRAND}: Verify Your Email"),
        text: format!("Your OTP for {BRAND} is: {otp}. It is valid for {ttl_minutes} minutes."),
        html: format!(
            "<p>Your OTP for {BRAND} is: <strong>{otp}</strong></p>\
             <p>It is valid for {ttl_minutes} minutes.</p>"
        ),
    }
}

pub fn resend_otp(to: &str, otp: &str, ttl_minutes: i64) -> Mail {
    Mail {
        to: to.into(),
        subject: format!("{BRAND}: Your New OTP"),
        text: format!("Your new OTP for {BRAND} is: {otp}. It is valid for {ttl_minutes} minutes."),
        html: format!(
            "<p>Your new OTP for {BRAND} is: <strong>{otp}</strong></p>\
             <p>It is valid for {ttl_minutes} minutes.</p>"
        ),
    }
}

pub fn password_reset(to: &str, reset_url: &str) -> Mail {
    Mail {
        to: to.into(),
        subject: format!("{BRAND}: Password Reset Request"),
        text: format!(
            "You are receiving this because you (or someone else) requested a password reset \
             for your account.\n\nOpen the following link to complete the process:\n\n{reset_url}\n\n\
             If you did not request this, ignore this email and your password will remain unchanged."
        ),
        html: format!(
            "<p>You are receiving this because you (or someone else) requested a password reset \
             for your account.</p>\
             <p><a href=\"{url}\">Reset Password</a></p>\
             <p>If you did not request this, ignore this email and your password will remain unchanged.</p>",
            url = escape(reset_url)
        ),
    }
}

pub fn swap_received(to: &str, sender_name: &str, message: &str, skills: &[String]) -> Mail {
    let skills = skills.join(", ");
    Mail {
        to: to.into(),
        subject: format!("{BRAND}: New Swap Request!"),
        text: format!(
            "You have received a new skill swap request from {sender_name}.\n\
             Message: \"{message}\"\nSkills involved: {skills}\n\
             Log in to your dashboard to respond."
        ),
        html: format!(
            "<p>You have received a new skill swap request from <strong>{}</strong>.</p>\
             <p>Message: \"{}\"</p><p>Skills involved: {}</p>\
             <p>Log in to your {BRAND} dashboard to respond.</p>",
            escape(sender_name),
            escape(message),
            escape(&skills)
        ),
    }
}

pub fn swap_status_changed(
    to: &str,
    actor_name: &str,
    status: SwapStatus,
    skills: &[String],
) -> Mail {
    let skills = skills.join(", ");
    let (subject, verb, tail) = match status {
        SwapStatus::Accepted => (
            "Skill Swap Request Accepted!",
            "has accepted your",
            "<p>Connect with them to arrange the swap!</p>",
        ),
        SwapStatus::Rejected => ("Skill Swap Request Rejected", "has rejected your", ""),
        SwapStatus::Cancelled => ("Skill Swap Request Cancelled", "has cancelled the", ""),
        SwapStatus::Pending => ("Skill Swap Request Updated", "has updated the", ""),
    };
    Mail {
        to: to.into(),
        subject: subject.into(),
        text: format!("{actor_name} {verb} skill swap request for {skills}."),
        html: format!(
            "<p><strong>{}</strong> {verb} skill swap request for <strong>{}</strong>.</p>{tail}",
            escape(actor_name),
            escape(&skills)
        ),
    }
}

pub fn broadcast(to: &str, message: &str) -> Mail {
    Mail {
        to: to.into(),
        subject: format!("{BRAND}: Platform Update"),
        text: message.into(),
        html: format!("<p>{}</p>", escape(message)),
    }
}
