//! Layout components - page shell, hero header, containers

use axum::response::Html;

use super::escape_html;

/// Renders the hero header with the search input underneath.
///
/// `search_input` is already-rendered HTML and is inserted verbatim.
pub fn hero_header(search_input: &str) -> String {
    format!(
        r#"<header class="text-center mb-12">
            <div class="text-7xl mb-6">🎬</div>
            <h1 class="text-4xl md:text-5xl font-bold text-white max-w-3xl mx-auto leading-tight">
                Find <span class="text-gradient">movies</span> you'll enjoy without the hassle
            </h1>
            <div class="mt-10 max-w-2xl mx-auto">{search_input}</div>
        </header>"#
    )
}

/// Renders a titled page section.
///
/// `content` is inserted verbatim; the title is escaped.
pub fn section(id: &str, title: &str, content: &str) -> String {
    let title = escape_html(title);
    format!(
        r#"<section id="{id}" class="space-y-6">
            <h2 class="text-2xl font-semibold text-white">{title}</h2>
            {content}
        </section>"#
    )
}

/// Renders an input field with Tailwind styling.
///
/// Supports additional HTML attributes for HTMX triggers or validation.
pub fn input(
    name: &str,
    placeholder: &str,
    value: &str,
    input_type: &str,
    attributes: Option<&str>,
) -> String {
    let attrs = attributes.unwrap_or("");
    let value = escape_html(value);
    let placeholder = escape_html(placeholder);

    format!(
        r#"<input type="{input_type}" name="{name}" value="{value}" placeholder="{placeholder}"
                  class="w-full px-4 py-3 bg-gray-800 border border-gray-700 rounded-lg text-white placeholder-gray-400 focus:outline-none focus:ring-2 focus:ring-marquee-500 focus:border-transparent"
                  {attrs} />"#
    )
}

/// Wraps page content in the shared HTML document with Tailwind and HTMX.
pub fn render_page(title: &str, content: &str) -> Html<String> {
    let title = escape_html(title);
    let html = format!(
        r#"<!DOCTYPE html>
        <html lang="en">
        <head>
            <title>{title} - Marquee</title>
            <meta charset="utf-8">
            <meta name="viewport" content="width=device-width, initial-scale=1">
            <script src="https://cdn.tailwindcss.com"></script>
            <script src="https://unpkg.com/htmx.org@1.9.10"></script>
            <script>
                tailwind.config = {{
                    darkMode: 'class',
                    theme: {{
                        extend: {{
                            colors: {{
                                'marquee': {{
                                    400: '#d6c7ff',
                                    500: '#ab8bff',
                                    600: '#8f6bef',
                                    900: '#030014'
                                }}
                            }}
                        }}
                    }}
                }}
            </script>
            <style>
                .text-gradient {{
                    background: linear-gradient(90deg, #d6c7ff 0%, #ab8bff 100%);
                    -webkit-background-clip: text;
                    background-clip: text;
                    color: transparent;
                }}
                .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
                .htmx-request .htmx-indicator {{ opacity: 1; }}
            </style>
        </head>
        <body class="bg-marquee-900 text-white min-h-screen font-sans">
            <main class="max-w-7xl mx-auto px-4 py-12">
                {content}
            </main>
        </body>
        </html>"#
    );

    Html(html)
}
