use serenity::{
    model::prelude::{
        application_command::ApplicationCommandInteraction, InteractionResponseType, UserId,
    },
    prelude::Context,
};

pub const MAX_CHANNEL_NAME: usize = 90;

/// Turns an article title into a channel name: lowercase, alphanumeric runs
/// joined by single dashes, at most 90 characters.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let slug: String = slug.chars().take(MAX_CHANNEL_NAME).collect();
    match slug.trim_end_matches('-') {
        "" => "article".to_string(),
        s => s.to_string(),
    }
}

/// Parses a user mention such as `<@123>` or `<@!123>`.
pub fn parse_mention(token: &str) -> Option<UserId> {
    let inner = token.strip_prefix("<@")?.strip_suffix('>')?;
    let digits = inner.strip_prefix('!').unwrap_or(inner);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(UserId)
}

/// Splits whitespace separated mentions into distinct user ids (first
/// occurrence wins) and the tokens that were not mentions.
pub fn parse_mentions(text: &str) -> (Vec<UserId>, Vec<String>) {
    let mut users = Vec::new();
    let mut rejected = Vec::new();
    for token in text.split_whitespace() {
        match parse_mention(token) {
            Some(user) if !users.contains(&user) => users.push(user),
            Some(_) => {}
            None => rejected.push(token.to_string()),
        }
    }
    (users, rejected)
}

pub async fn interaction_reply_ephemeral(
    command: &ApplicationCommandInteraction,
    ctx: &Context,
    content: impl ToString,
) -> Result<(), anyhow::Error> {
    command
        .create_interaction_response(&ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|message| message.content(content).ephemeral(true))
        })
        .await?;
    Ok(())
}

/// Acknowledges the command so Discord does not time out while we work.
pub async fn defer_ephemeral(
    command: &ApplicationCommandInteraction,
    ctx: &Context,
) -> Result<(), anyhow::Error> {
    command
        .create_interaction_response(&ctx.http, |response| {
            response
                .kind(InteractionResponseType::DeferredChannelMessageWithSource)
                .interaction_response_data(|message| message.ephemeral(true))
        })
        .await?;
    Ok(())
}

pub async fn interaction_reply_edit(
    command: &ApplicationCommandInteraction,
    ctx: &Context,
    content: impl ToString,
) -> Result<(), anyhow::Error> {
    command
        .edit_original_interaction_response(&ctx.http, |response| response.content(content))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    #[test]
    fn slugify_known_titles() {
        assert_eq!(slugify("Q3 Budget Review"), "q3-budget-review");
        assert_eq!(slugify("  Hello,  World!!  "), "hello-world");
        assert_eq!(slugify("--Already--dashed--"), "already-dashed");
        assert_eq!(slugify("!!!"), "article");
        assert_eq!(slugify(""), "article");
    }

    #[test]
    fn slugify_truncates_without_trailing_dash() {
        let title = format!("{} tail", "a".repeat(89));
        let slug = slugify(&title);
        assert_eq!(slug, "a".repeat(89));

        assert_eq!(slugify(&"b".repeat(200)).chars().count(), MAX_CHANNEL_NAME);
    }

    quickcheck! {
        fn slugify_is_a_clean_channel_name(title: String) -> bool {
            let slug = slugify(&title);
            !slug.is_empty()
                && slug.chars().count() <= MAX_CHANNEL_NAME
                && !slug.contains("--")
                && !slug.starts_with('-')
                && !slug.ends_with('-')
                && !slug.chars().any(char::is_uppercase)
        }
    }

    #[test]
    fn mentions() {
        assert_eq!(parse_mention("<@123>"), Some(UserId(123)));
        assert_eq!(parse_mention("<@!456>"), Some(UserId(456)));
        assert_eq!(parse_mention("<@&789>"), None);
        assert_eq!(parse_mention("<@>"), None);
        assert_eq!(parse_mention("@alice"), None);
        assert_eq!(parse_mention("<@99999999999999999999999>"), None);
    }

    #[test]
    fn mentions_are_deduplicated() {
        let (users, rejected) = parse_mentions("<@1> <@!2>  <@1> bob <#3>");
        assert_eq!(users, vec![UserId(1), UserId(2)]);
        assert_eq!(rejected, vec!["bob".to_string(), "<#3>".to_string()]);
    }
}
