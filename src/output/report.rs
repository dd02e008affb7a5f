//! Human-readable reports of fetched entities.

use console::style;

use crate::models::{Creator, DirectMessage, Membership, Post, SegmentKind, User};

fn flag(value: bool) -> String {
    if value {
        style("yes").green().to_string()
    } else {
        style("no").dim().to_string()
    }
}

/// Print the authenticated user.
pub fn print_user(user: &User) {
    println!();
    println!("{}", style(format!("{} user:", user.client_name())).bold());
    println!("  ID:     {}", user.id);
    println!("  Name:   {}", user.name);
    if let Some(avatar) = &user.avatar {
        println!("  Avatar: {}", avatar);
    }
}

/// Print a creator profile.
pub fn print_creator(creator: &Creator) {
    println!();
    println!("{}", style(format!("{} (@{})", creator.name, creator.id)).bold());
    println!("  Homepage:  {}", creator.homepage);
    println!("  Following: {}", flag(creator.is_following));
    println!("  Member:    {}", flag(creator.is_member));
    println!("  NSFW:      {}", flag(creator.is_nsfw));
    if creator.is_stopped {
        println!("  {}", style("This creator has paused their page.").yellow());
    }
    for link in &creator.profile_links {
        println!("  Link:      {}", link);
    }
    if let Some(description) = &creator.description {
        println!();
        for line in description.lines() {
            println!("  {}", style(line).dim());
        }
    }
}

/// Print a one-line summary of a post and its segments.
pub fn print_post(post: &Post) {
    let lock = if post.is_privileged {
        String::new()
    } else {
        format!(" {}", style("[restricted]").yellow())
    };
    println!(
        "{} {} {}{}",
        style(post.published_time.format("%Y-%m-%d")).dim(),
        style(&post.id).cyan(),
        post.title,
        lock
    );

    if !post.body.is_empty() {
        println!(
            "    {} paragraphs, {} images, {} videos, {} files",
            post.body.of_kind(SegmentKind::Paragraph).len(),
            post.body.images().len(),
            post.body.videos().len(),
            post.body.files().len()
        );
    } else if let Some(excerpt) = &post.excerpt {
        println!("    {}", style(excerpt.lines().next().unwrap_or_default()).dim());
    }
}

/// Print a support plan.
pub fn print_membership(plan: &Membership) {
    println!(
        "{} {} {} (@{})",
        style(&plan.id).cyan(),
        style(&plan.price).green().bold(),
        plan.name,
        plan.creator
    );
}

/// Print a received message.
pub fn print_message(message: &DirectMessage) {
    let marker = if message.is_read {
        style("read").dim()
    } else {
        style("new").yellow().bold()
    };
    println!(
        "{} {} @{} [{}]",
        style(message.sent_time.format("%Y-%m-%d %H:%M")).dim(),
        style(&message.id).cyan(),
        message.creator,
        marker
    );
    if let Some(text) = &message.message {
        for line in text.lines() {
            println!("    {}", line);
        }
    }
}

/// Print how many items were fetched.
pub fn print_summary(kind: &str, count: usize) {
    println!();
    println!("Fetched {} {}", style(count).green(), kind);
}
