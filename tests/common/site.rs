//! A mock of the music site served by wiremock

use super::fixtures::{detail_page, home_page, listing_page};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Wiremock server plus URL helpers for the site's paths
pub struct MockSite {
    pub server: MockServer,
}

impl MockSite {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    pub fn artist_url(&self, slug: &str) -> String {
        format!("{}/artist/{slug}/", self.base_url())
    }

    pub fn song_url(&self, id: u32) -> String {
        format!("{}/download-song/{id}/", self.base_url())
    }

    pub fn audio_url(&self, file_name: &str) -> String {
        format!("{}/tagdl/{}", self.base_url(), file_name.replace(' ', "%20"))
    }

    /// Serve the home page listing `names`, with slugs "artist-1".."artist-N"
    pub async fn mount_home(&self, names: &[String]) {
        let artists: Vec<(String, String)> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), self.artist_url(&format!("artist-{}", i + 1))))
            .collect();
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(home_page(&artists)))
            .mount(&self.server)
            .await;
    }

    /// Serve an artist listing split into `pages`, each a list of `(id, title)`
    ///
    /// Every page is expected to be requested exactly once.
    pub async fn mount_listing(&self, slug: &str, pages: &[Vec<(u32, String)>]) {
        let artist_url = self.artist_url(slug);
        let last = (pages.len() > 1).then_some(pages.len() as u32);
        for (index, songs) in pages.iter().enumerate() {
            let number = index as u32 + 1;
            let route = if number == 1 {
                format!("/artist/{slug}/")
            } else {
                format!("/artist/{slug}/page/{number}")
            };
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(
                    ResponseTemplate::new(200).set_body_string(listing_page(
                        &artist_url,
                        songs,
                        &self.base_url(),
                        last,
                    )),
                )
                .expect(1)
                .mount(&self.server)
                .await;
        }
    }

    /// Serve a detail page advertising `file_names` as audio links
    pub async fn mount_detail(&self, id: u32, file_names: &[&str]) {
        let links: Vec<String> = file_names.iter().map(|name| self.audio_url(name)).collect();
        Mock::given(method("GET"))
            .and(path(format!("/download-song/{id}/")))
            .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(&links)))
            .mount(&self.server)
            .await;
    }

    /// Serve an audio body, expecting exactly `expected_hits` requests
    pub async fn mount_audio(&self, file_name: &str, body: &[u8], expected_hits: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/tagdl/{}", file_name.replace(' ', "%20"))))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
            .expect(expected_hits)
            .mount(&self.server)
            .await;
    }
}
