//! HTML page rendering.
//!
//! One page, many states: each section is drawn only when its field in
//! [`PageContext`] is present.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::movies::{MovieDetail, SearchResult};
use crate::reviews::{AnalyzedReview, ReviewAnalysis};

#[derive(Debug, Default)]
pub struct PageContext {
    pub movies: Option<Vec<SearchResult>>,
    pub movie: Option<MovieDetail>,
    pub analysis: Option<ReviewAnalysis>,
    pub error: Option<String>,
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; color: #222; }
form { display: flex; gap: .5rem; margin-bottom: 1.5rem; }
input[type=text] { flex: 1; padding: .5rem; }
.error { background: #fde2e2; color: #8a1f1f; padding: 1rem; border-radius: 4px; }
.movie { display: flex; gap: 1.5rem; }
.movie img { width: 220px; border-radius: 4px; }
.bar { display: flex; height: 1.5rem; border-radius: 4px; overflow: hidden; margin: .5rem 0; }
.bar .positive { background: #2e9d4f; }
.bar .negative { background: #c0392b; }
.review { border-left: 4px solid #ccc; padding: .5rem 1rem; margin: 1rem 0; }
.review.positive { border-color: #2e9d4f; }
.review.negative { border-color: #c0392b; }
.meta { color: #666; font-size: .9rem; }
"#;

pub fn render_page(ctx: &PageContext) -> String {
    let mut body = String::new();
    body.push_str(&search_form());

    if let Some(error) = &ctx.error {
        body.push_str(&format!(r#"<div class="error">{}</div>"#, encode_text(error)));
    }
    if let Some(movies) = &ctx.movies {
        body.push_str(&search_results(movies));
    }
    if let Some(movie) = &ctx.movie {
        body.push_str(&movie_card(movie));
    }
    if let Some(analysis) = &ctx.analysis {
        body.push_str(&sentiment_breakdown(analysis));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Movie Review Sentiment</title>
<style>{}</style>
</head>
<body>
<h1>Movie Review Sentiment</h1>
{}
</body>
</html>
"#,
        STYLE, body
    )
}

fn search_form() -> String {
    r#"<form method="post" action="/search">
<input type="text" name="movie" placeholder="Search for a movie" required>
<button type="submit">Search</button>
</form>
"#
    .to_string()
}

fn search_results(movies: &[SearchResult]) -> String {
    if movies.is_empty() {
        return "<p>No movies found.</p>\n".to_string();
    }

    let items: String = movies
        .iter()
        .map(|m| {
            format!(
                "<li><a href=\"/movie/{}\">{}</a> ({})</li>\n",
                m.id,
                encode_text(&m.title),
                encode_text(&m.year)
            )
        })
        .collect();

    format!("<ul class=\"results\">\n{}</ul>\n", items)
}

fn movie_card(movie: &MovieDetail) -> String {
    let poster = if movie.poster_url.is_empty() {
        String::new()
    } else {
        format!(
            r#"<img src="{}" alt="{} poster">"#,
            encode_double_quoted_attribute(&movie.poster_url),
            encode_double_quoted_attribute(&movie.title)
        )
    };
    let rating = movie
        .vote_average
        .map(|v| format!("{:.1}", v))
        .unwrap_or_default();
    let runtime = movie
        .runtime
        .map(|r| format!("{} min", r))
        .unwrap_or_default();

    format!(
        r#"<section class="movie">
{}
<div>
<h2>{}</h2>
<p class="meta">Rating: {} | Runtime: {} | Genres: {}</p>
<p><strong>Director:</strong> {}</p>
<p><strong>Cast:</strong> {}</p>
<p>{}</p>
</div>
</section>
"#,
        poster,
        encode_text(&movie.title),
        encode_text(&rating),
        encode_text(&runtime),
        encode_text(&movie.genres),
        encode_text(&movie.director),
        encode_text(&movie.cast),
        encode_text(&movie.overview)
    )
}

fn sentiment_breakdown(analysis: &ReviewAnalysis) -> String {
    let s = &analysis.summary;
    let mut out = format!(
        r#"<section class="sentiment">
<h2>Review Sentiment</h2>
<p>Positive: {} ({}%) | Negative: {} ({}%)</p>
<div class="bar"><div class="positive" style="width: {}%"></div><div class="negative" style="width: {}%"></div></div>
"#,
        s.positive_count,
        s.positive_percent,
        s.negative_count,
        s.negative_percent,
        s.positive_percent,
        s.negative_percent
    );

    if analysis.reviews.is_empty() {
        out.push_str("<p>No reviews available.</p>\n");
    }
    for review in &analysis.reviews {
        out.push_str(&review_card(review));
    }
    out.push_str("</section>\n");
    out
}

fn review_card(review: &AnalyzedReview) -> String {
    let rating = review
        .rating
        .map(|r| format!("{:.1}", r))
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        r#"<article class="review {}">
<p class="meta">{} | Rating: {} | Sentiment: {} ({})</p>
<p>{}</p>
</article>
"#,
        review.polarity.as_str(),
        encode_text(&review.author),
        encode_text(&rating),
        encode_text(&review.sentiment_label),
        review.polarity.as_str(),
        encode_text(&review.content)
    )
}
