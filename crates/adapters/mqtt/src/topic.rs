//! Inbound command topic parsing.

use harmony_domain::slug::Slug;

/// Parse `{namespace}/hubs/{hubSlug}/activities/{activitySlug}/command`
/// into its two slugs.
///
/// Returns `None` for anything that does not match the pattern exactly;
/// slugs may not contain `/`, so each segment is a single path element.
#[must_use]
pub fn parse_command_topic(namespace: &str, topic: &str) -> Option<(Slug, Slug)> {
    let rest = topic.strip_prefix(namespace)?.strip_prefix('/')?;
    let mut segments = rest.split('/');
    if segments.next()? != "hubs" {
        return None;
    }
    let hub = segments.next()?;
    if segments.next()? != "activities" {
        return None;
    }
    let activity = segments.next()?;
    if segments.next()? != "command" || segments.next().is_some() {
        return None;
    }
    if hub.is_empty() || activity.is_empty() {
        return None;
    }
    Some((Slug::from(hub), Slug::from(activity)))
}
