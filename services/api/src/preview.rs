use chrono::Utc;
use clap::Args;
use sg_contact::error::AppError;
use sg_contact::inquiries::{Inquiry, InquiryEmail, InquiryId, NewInquiry};

#[derive(Args, Debug)]
pub(crate) struct PreviewArgs {
    /// Sender name shown in the subject line
    #[arg(long, default_value = "Jordan Example")]
    pub(crate) name: String,
    /// Sender address used as Reply-To
    #[arg(long, default_value = "jordan@example.com")]
    pub(crate) email: String,
    #[arg(long)]
    pub(crate) phone: Option<String>,
    #[arg(long)]
    pub(crate) company: Option<String>,
    #[arg(
        long,
        default_value = "We are planning a regional expansion and would like to talk.\nAre you available next week?"
    )]
    pub(crate) message: String,
    /// Print the HTML body instead of the plain-text body
    #[arg(long)]
    pub(crate) html: bool,
}

pub(crate) fn run_preview(args: PreviewArgs) -> Result<(), AppError> {
    let PreviewArgs {
        name,
        email,
        phone,
        company,
        message,
        html,
    } = args;

    let inquiry = Inquiry::from_new(
        InquiryId(0),
        NewInquiry {
            name,
            email,
            phone,
            company,
            message: message.replace("\\n", "\n"),
        },
        Utc::now(),
    );
    let rendered = InquiryEmail::compose(&inquiry);

    println!("Subject: {}", rendered.subject);
    println!("Reply-To: {}", rendered.reply_to);
    println!();
    if html {
        println!("{}", rendered.html_body);
    } else {
        println!("{}", rendered.text_body);
    }
    Ok(())
}
