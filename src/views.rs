//! Server-rendered HTML pages for the fruits resource.

use crate::model::Fruit;
use std::fmt::Write;

/// A named page plus the data it renders.
pub enum Page<'a> {
    Index(&'a [Fruit]),
    New,
    Edit(&'a Fruit),
    Show(&'a Fruit),
}

impl Page<'_> {
    pub fn template_name(&self) -> &'static str {
        match self {
            Page::Index(_) => "fruits/index",
            Page::New => "fruits/new",
            Page::Edit(_) => "fruits/edit",
            Page::Show(_) => "fruits/show",
        }
    }
}

pub fn render(page: Page<'_>) -> String {
    tracing::debug!(template = page.template_name(), "render");
    let (title, body) = match page {
        Page::Index(fruits) => ("Fruits".to_string(), index(fruits)),
        Page::New => ("New Fruit".to_string(), form("/fruits", None)),
        Page::Edit(fruit) => (
            format!("Edit {}", escape(display_name(fruit))),
            form(&format!("/fruits/{}?_method=PUT", fruit.id), Some(fruit)),
        ),
        Page::Show(fruit) => (escape(display_name(fruit)), show(fruit)),
    };
    layout(&title, &body)
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<nav><a href=\"/fruits\">Fruits</a> | <a href=\"/fruits/new\">New Fruit</a></nav>\n<h1>{title}</h1>\n{body}</body>\n</html>\n"
    )
}

fn index(fruits: &[Fruit]) -> String {
    if fruits.is_empty() {
        return "<p>No fruits yet.</p>\n".to_string();
    }
    let mut out = String::from("<ul>\n");
    for fruit in fruits {
        let _ = writeln!(
            out,
            "<li><a href=\"/fruits/{}\">{}</a></li>",
            fruit.id,
            escape(display_name(fruit))
        );
    }
    out.push_str("</ul>\n");
    out
}

fn show(fruit: &Fruit) -> String {
    let ready = if fruit.is_ready_to_eat() {
        "It is ready to eat"
    } else {
        "It is not ready to eat"
    };
    format!(
        "<p>The {name} is {color}</p>\n<p>{ready}</p>\n<a href=\"/fruits/{id}/edit\"><button>Edit</button></a>\n<form action=\"/fruits/{id}?_method=DELETE\" method=\"POST\">\n<input type=\"submit\" value=\"Delete\">\n</form>\n",
        name = escape(display_name(fruit)),
        color = escape(fruit.color.as_deref().unwrap_or("")),
        id = fruit.id,
    )
}

fn form(action: &str, fruit: Option<&Fruit>) -> String {
    let name = fruit.and_then(|f| f.name.as_deref()).unwrap_or("");
    let color = fruit.and_then(|f| f.color.as_deref()).unwrap_or("");
    let checked = if fruit.map(Fruit::is_ready_to_eat).unwrap_or(false) {
        " checked"
    } else {
        ""
    };
    let submit = if fruit.is_some() { "Update Fruit" } else { "Create Fruit" };
    format!(
        "<form action=\"{action}\" method=\"POST\">\n<label>Name <input type=\"text\" name=\"name\" value=\"{name}\"></label>\n<label>Color <input type=\"text\" name=\"color\" value=\"{color}\"></label>\n<label>Ready to eat <input type=\"checkbox\" name=\"readyToEat\"{checked}></label>\n<input type=\"submit\" value=\"{submit}\">\n</form>\n",
        action = escape(action),
        name = escape(name),
        color = escape(color),
    )
}

fn display_name(fruit: &Fruit) -> &str {
    fruit.name.as_deref().unwrap_or("(unnamed)")
}

/// Escape text for use in HTML element content and double-quoted attributes.
pub fn escape(s: &str) -> String {
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
