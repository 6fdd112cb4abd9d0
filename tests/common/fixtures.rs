//! Markup fixtures shaped like the real site

/// Home page with an `aside.rwr` artist list
pub fn home_page(artists: &[(String, String)]) -> String {
    let items: String = artists
        .iter()
        .map(|(name, url)| format!(r#"<li class="cat-item"><a href="{url}">{name}</a></li>"#))
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html lang="fa" dir="rtl">
<head><meta charset="utf-8"><title>موزیکفا</title></head>
<body>
  <header><nav><a href="/">خانه</a></nav></header>
  <aside class="rwr"><h3>خوانندگان</h3><ul>{items}</ul></aside>
</body>
</html>"#
    )
}

/// One artist listing page: an `article` per song and, when the listing spans
/// several pages, a `div.pnavifa.fxmf` block whose last link is the last page
pub fn listing_page(artist_url: &str, songs: &[(u32, String)], base: &str, last_page: Option<u32>) -> String {
    let articles: String = songs
        .iter()
        .map(|(id, title)| {
            format!(
                r#"<article class="postbox"><a href="{base}/download-song/{id}/" title="دانلود آهنگ {title}"><img src="{base}/cover/{id}.jpg"></a><h2>{title}</h2></article>"#
            )
        })
        .collect();
    let pagination = match last_page {
        Some(last) => {
            let links: String = (2..=last)
                .map(|n| format!(r#"<a class="page-numbers" href="{}/page/{n}/">{n}</a>"#, artist_url.trim_end_matches('/')))
                .collect();
            format!(r#"<div class="pnavifa fxmf"><span class="current">1</span>{links}</div>"#)
        }
        None => String::new(),
    };
    format!(
        r#"<!DOCTYPE html>
<html><body><main>{articles}</main>{pagination}</body></html>"#
    )
}

/// Song detail page with the download links inside `div.cntfa`
pub fn detail_page(links: &[String]) -> String {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<p><a href="{link}" class="dlbtn">دانلود</a></p>"#))
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html><body>
  <div class="cntfa"><img src="cover.jpg" alt="cover">{anchors}<a href="/tag/pop/">pop</a></div>
  <footer><a href="https://elsewhere.example/ad.mp3">ad</a></footer>
</body></html>"#
    )
}
