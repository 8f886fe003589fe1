//! Tera-backed [`FragmentRenderer`].
//!
//! Fragments are embedded in web replies; standalone renders wrap the same
//! fragment in a full HTML document for publishing. Every template name ends
//! in `.html`, so Tera autoescapes every interpolated field.

use std::collections::HashMap;

use tera::{Context, Tera};
use tracing::warn;
use wren_agent::adapters::FragmentRenderer;
use wren_core::domain::results::{ListView, Location};
use wren_core::errors::RenderError;
use wren_core::ResourceType;

const LIST_TEMPLATE: &str = "results/list.html";
const LOCATION_TEMPLATE: &str = "results/location.html";
const DOCUMENT_TEMPLATE: &str = "results/document.html";

const EMBEDDED: [(&str, &str); 3] = [
    (LIST_TEMPLATE, include_str!("../../../templates/results/list.html")),
    (LOCATION_TEMPLATE, include_str!("../../../templates/results/location.html")),
    (DOCUMENT_TEMPLATE, include_str!("../../../templates/results/document.html")),
];

/// Register the custom filters the result templates use.
///
/// - `video_duration`: ISO-8601 durations as clock time, `PT4M13S` becomes `4:13`
/// - `thousands`: digit grouping, `1234567` becomes `1,234,567`
pub fn register_template_filters(tera: &mut Tera) {
    tera.register_filter("video_duration", video_duration_filter);
    tera.register_filter("thousands", thousands_filter);
}

fn video_duration_filter(value: &tera::Value, _args: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
    let raw = value.as_str().unwrap_or_default();
    Ok(tera::Value::String(clock_duration(raw).unwrap_or_else(|| raw.to_string())))
}

fn thousands_filter(value: &tera::Value, _args: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
    let number = match value {
        tera::Value::Number(number) => number.as_u64().unwrap_or(0),
        _ => 0,
    };
    Ok(tera::Value::String(group_thousands(number)))
}

fn clock_duration(iso: &str) -> Option<String> {
    let mut rest = iso.strip_prefix("PT")?;
    let (mut hours, mut minutes, mut seconds) = (0u64, 0u64, 0u64);
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit())?;
        let amount: u64 = rest[..digits].parse().ok()?;
        match rest[digits..].chars().next()? {
            'H' => hours = amount,
            'M' => minutes = amount,
            'S' => seconds = amount,
            _ => return None,
        }
        rest = &rest[digits + 1..];
    }
    if hours > 0 {
        Some(format!("{hours}:{minutes:02}:{seconds:02}"))
    } else {
        Some(format!("{minutes}:{seconds:02}"))
    }
}

fn group_thousands(number: u64) -> String {
    let digits = number.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

pub struct TeraRenderer {
    tera: Tera,
}

impl TeraRenderer {
    /// Loads templates from `template_dir`, falling back to the copies
    /// compiled into the binary when the directory is missing or broken.
    pub fn new(template_dir: &str) -> Self {
        let loaded = Tera::new(&format!("{}/**/*.html", template_dir.trim_end_matches('/')))
            .map_err(|error| error.to_string())
            .and_then(|tera| {
                let names: Vec<&str> = tera.get_template_names().collect();
                match EMBEDDED.iter().find(|(name, _)| !names.contains(name)) {
                    Some((missing, _)) => Err(format!("template `{missing}` not found")),
                    None => Ok(tera),
                }
            });

        match loaded {
            Ok(mut tera) => {
                register_template_filters(&mut tera);
                Self { tera }
            }
            Err(error) => {
                warn!(
                    event_name = "system.templates.fallback",
                    template_dir,
                    error = %error,
                    "failed to load result templates from filesystem, using embedded templates"
                );
                Self::embedded()
            }
        }
    }

    pub fn embedded() -> Self {
        let mut tera = Tera::default();
        register_template_filters(&mut tera);
        for (name, source) in EMBEDDED {
            if let Err(error) = tera.add_raw_template(name, source) {
                warn!(event_name = "system.templates.invalid", template = name, error = %error, "embedded template rejected");
            }
        }
        Self { tera }
    }

    fn render(&self, template: &str, context: &Context) -> Result<String, RenderError> {
        if !self.tera.get_template_names().any(|name| name == template) {
            return Err(RenderError::UnknownTemplate(template.to_string()));
        }
        self.tera.render(template, context).map_err(|error| RenderError::Template {
            template: template.to_string(),
            message: render_error_chain(&error),
        })
    }

    fn document(&self, title: &str, body: &str) -> Result<String, RenderError> {
        let mut context = Context::new();
        context.insert("title", title);
        context.insert("body", body);
        self.render(DOCUMENT_TEMPLATE, &context)
    }
}

/// Tera nests the useful cause a level or two down.
fn render_error_chain(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn list_title(view: &ListView<'_>) -> String {
    match view.resource {
        ResourceType::Cause => "Worthy causes".to_string(),
        resource => format!("{}s of {}", capitalize(resource.as_str()), view.subject),
    }
}

fn capitalize(word: &str) -> String {
    let mut characters = word.chars();
    match characters.next() {
        Some(first) => first.to_uppercase().chain(characters).collect(),
        None => String::new(),
    }
}

impl FragmentRenderer for TeraRenderer {
    fn render_list(&self, view: &ListView<'_>) -> Result<String, RenderError> {
        let context = Context::from_serialize(view).map_err(|error| RenderError::Template {
            template: LIST_TEMPLATE.to_string(),
            message: error.to_string(),
        })?;
        let fragment = self.render(LIST_TEMPLATE, &context)?;
        if !view.standalone {
            return Ok(fragment);
        }
        self.document(&list_title(view), &fragment)
    }

    fn render_location(&self, location: &Location, standalone: bool) -> Result<String, RenderError> {
        let context = Context::from_serialize(location).map_err(|error| RenderError::Template {
            template: LOCATION_TEMPLATE.to_string(),
            message: error.to_string(),
        })?;
        let fragment = self.render(LOCATION_TEMPLATE, &context)?;
        if !standalone {
            return Ok(fragment);
        }
        self.document(location.display_name(), &fragment)
    }
}

#[cfg(test)]
mod tests {
    use wren_agent::adapters::FragmentRenderer;
    use wren_core::domain::results::{CauseItem, ImageItem, ListView, Location, ResultItems, VideoItem};
    use wren_core::ResourceType;

    use super::{clock_duration, group_thousands, TeraRenderer};

    fn image(title: &str) -> ImageItem {
        ImageItem {
            id: "1".to_string(),
            title: title.to_string(),
            owner: "ansel".to_string(),
            thumbnail_url: "https://live.staticflickr.com/1_s.jpg".to_string(),
            page_url: "https://www.flickr.com/photos/ansel/1".to_string(),
        }
    }

    #[test]
    fn durations_render_as_clock_time() {
        assert_eq!(clock_duration("PT4M13S").as_deref(), Some("4:13"));
        assert_eq!(clock_duration("PT1H2M3S").as_deref(), Some("1:02:03"));
        assert_eq!(clock_duration("PT45S").as_deref(), Some("0:45"));
        assert_eq!(clock_duration("P1D"), None);
    }

    #[test]
    fn counts_are_grouped_by_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn list_fields_are_escaped() {
        let renderer = TeraRenderer::embedded();
        let items = ResultItems::Images(vec![image("<script>alert(1)</script>")]);
        let view = ListView { resource: ResourceType::Image, subject: "cats", items: &items, standalone: false };

        let markup = match renderer.render_list(&view) {
            Ok(markup) => markup,
            Err(error) => panic!("list should render: {error}"),
        };
        assert!(markup.contains("&lt;script&gt;"), "{markup}");
        assert!(!markup.contains("<script>"));
        assert!(!markup.contains("<html"));
    }

    #[test]
    fn standalone_lists_are_full_documents() {
        let renderer = TeraRenderer::embedded();
        let items = ResultItems::Videos(vec![VideoItem {
            id: "abc".to_string(),
            title: "Quadrocopter tricks".to_string(),
            channel_title: "Drones Daily".to_string(),
            thumbnail_url: "https://i.ytimg.com/vi/abc/mqdefault.jpg".to_string(),
            published_at: None,
            duration: Some("PT4M13S".to_string()),
            view_count: Some(12_500),
        }]);
        let view = ListView { resource: ResourceType::Video, subject: "quadrocopters", items: &items, standalone: true };

        let document = renderer.render_list(&view).unwrap_or_default();
        assert!(document.starts_with("<!DOCTYPE html>"), "{document}");
        assert!(document.contains("<title>Videos of quadrocopters</title>"));
        assert!(document.contains("4:13"));
        assert!(document.contains("12,500 views"));
    }

    #[test]
    fn cause_documents_do_not_mention_the_subject() {
        let renderer = TeraRenderer::embedded();
        let items = ResultItems::Causes(vec![CauseItem {
            title: "Robots for Room 12".to_string(),
            school_name: "Lincoln Elementary".to_string(),
            grade_level: "Grades 3-5".to_string(),
            proposal_url: "https://www.donorschoose.org/project/1".to_string(),
            image_url: String::new(),
        }]);
        let view = ListView { resource: ResourceType::Cause, subject: "coding", items: &items, standalone: true };

        let document = renderer.render_list(&view).unwrap_or_default();
        assert!(document.contains("<title>Worthy causes</title>"));
        assert!(document.contains("Lincoln Elementary"));
    }

    #[test]
    fn location_fragment_embeds_a_map() {
        let renderer = TeraRenderer::embedded();
        let location = Location {
            formatted_address: "Darwin, MN 55324, USA".to_string(),
            short_name: Some("Darwin".to_string()),
            latitude: 45.0966,
            longitude: -94.4108,
            postal_code: Some("55324".to_string()),
        };

        let fragment = renderer.render_location(&location, false).unwrap_or_default();
        assert!(fragment.contains("45.0966,-94.4108"), "{fragment}");
        assert!(fragment.contains("Darwin, MN 55324, USA"));
        let document = renderer.render_location(&location, true).unwrap_or_default();
        assert!(document.contains("<title>Darwin, MN 55324, USA</title>"));
    }

    #[test]
    fn missing_template_directory_falls_back_to_embedded_templates() {
        let renderer = TeraRenderer::new("/nonexistent/wren-templates");
        let items = ResultItems::Images(vec![image("Tabby")]);
        let view = ListView { resource: ResourceType::Image, subject: "cats", items: &items, standalone: false };
        assert!(renderer.render_list(&view).is_ok());
    }
}
