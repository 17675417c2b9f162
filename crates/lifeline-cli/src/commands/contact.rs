use clap::Subcommand;
use lifeline_core::{Contact, ContactBook, CoreError, NewContact};
use uuid::Uuid;

use crate::store::CliConfig;

#[derive(Subcommand)]
pub enum ContactAction {
    /// Add a contact
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Alert this contact on emergency entry
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        notify_on_emergency: bool,
        #[arg(long, default_value_t = false, action = clap::ArgAction::Set)]
        notify_on_warning: bool,
        /// Use the SMS channel
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        sms: bool,
        /// Use the email channel
        #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
        email_channel: bool,
    },
    /// List contacts
    List,
    /// Edit a contact by id
    Edit {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        notify_on_emergency: Option<bool>,
        #[arg(long)]
        notify_on_warning: Option<bool>,
        #[arg(long)]
        sms: Option<bool>,
        #[arg(long)]
        email_channel: Option<bool>,
    },
    /// Remove a contact by id
    Remove { id: Uuid },
}

pub fn run(action: ContactAction) -> Result<(), CoreError> {
    let mut config = CliConfig::load()?;
    let mut book = ContactBook::from_contacts(config.contacts.clone())?;

    match action {
        ContactAction::Add {
            name,
            phone,
            email,
            notify_on_emergency,
            notify_on_warning,
            sms,
            email_channel,
        } => {
            let id = book.add(NewContact {
                name,
                phone,
                email,
                notify_on_warning,
                notify_on_emergency,
                enable_sms: sms,
                enable_email: email_channel,
            });
            config.contacts = book.contacts().to_vec();
            config.save()?;
            println!("Added contact {id}");
        }
        ContactAction::List => {
            if book.is_empty() {
                println!("No contacts configured.");
            }
            for contact in book.contacts() {
                println!("{}", describe(contact));
            }
        }
        ContactAction::Edit {
            id,
            name,
            phone,
            email,
            notify_on_emergency,
            notify_on_warning,
            sms,
            email_channel,
        } => {
            let mut updated = book
                .get(id)
                .cloned()
                .ok_or(lifeline_core::ValidationError::UnknownContact { id })?;
            if let Some(name) = name {
                updated.name = name;
            }
            if let Some(phone) = phone {
                updated.phone = if phone.is_empty() { None } else { Some(phone) };
            }
            if let Some(email) = email {
                updated.email = if email.is_empty() { None } else { Some(email) };
            }
            if let Some(flag) = notify_on_emergency {
                updated.notify_on_emergency = flag;
            }
            if let Some(flag) = notify_on_warning {
                updated.notify_on_warning = flag;
            }
            if let Some(flag) = sms {
                updated.enable_sms = flag;
            }
            if let Some(flag) = email_channel {
                updated.enable_email = flag;
            }
            book.edit(updated)?;
            config.contacts = book.contacts().to_vec();
            config.save()?;
            println!("Updated contact {id}");
        }
        ContactAction::Remove { id } => {
            let removed = book.remove(id)?;
            config.contacts = book.contacts().to_vec();
            config.save()?;
            println!("Removed contact {} ({})", removed.name, id);
        }
    }
    Ok(())
}

fn describe(contact: &Contact) -> String {
    let mut channels = Vec::new();
    if contact.enable_sms {
        channels.push("sms");
    }
    if contact.enable_email {
        channels.push("email");
    }
    format!(
        "{}  {}  phone={}  email={}  channels=[{}]{}",
        contact.id,
        contact.name,
        contact.phone.as_deref().unwrap_or("-"),
        contact.email.as_deref().unwrap_or("-"),
        channels.join(","),
        if contact.notify_on_emergency {
            ""
        } else {
            "  (emergency alerts off)"
        }
    )
}
