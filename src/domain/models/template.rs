#[derive(Debug, Clone)]
pub struct SmsTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub body: &'static str,
    pub variables: &'static [&'static str],
}

pub const TEMPLATES: &[SmsTemplate] = &[
    SmsTemplate {
        id: "donation_thank_you",
        name: "Donation thank you",
        body: "Dear {name}, thank you for your donation of KES {amount}. Your support changes lives.",
        variables: &["name", "amount"],
    },
    SmsTemplate {
        id: "event_reminder",
        name: "Event reminder",
        body: "Hi {name}, reminder: {event} is on {date} at {venue}. We look forward to seeing you!",
        variables: &["name", "event", "date", "venue"],
    },
    SmsTemplate {
        id: "volunteer_welcome",
        name: "Volunteer welcome",
        body: "Welcome aboard {name}! Thank you for volunteering with us. We will contact you soon with next steps.",
        variables: &["name"],
    },
    SmsTemplate {
        id: "monthly_newsletter",
        name: "Monthly newsletter",
        body: "Hello {name}, our {month} update is out: {headline}. Read more on our website.",
        variables: &["name", "month", "headline"],
    },
    SmsTemplate {
        id: "emergency_appeal",
        name: "Emergency appeal",
        body: "Urgent: {cause}. Every shilling helps. Donate via M-Pesa Paybill {paybill}. Thank you!",
        variables: &["cause", "paybill"],
    },
];

pub fn find_template(id: &str) -> Option<&'static SmsTemplate> {
    TEMPLATES.iter().find(|t| t.id == id)
}
