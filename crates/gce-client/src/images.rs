use serde::Deserialize;

use crate::client::Client;
use crate::error::Result;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub name: String,
    pub self_link: String,
}

impl Client {
    /// Resolve the newest non-deprecated image in a family, e.g.
    /// `ubuntu-2204-lts` in `ubuntu-os-cloud`. The image lives in its own
    /// project, not the client's.
    pub fn image_from_family(&self, image_project: &str, family: &str) -> Result<Image> {
        self.get(&format!(
            "projects/{image_project}/global/images/family/{family}"
        ))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenSource;
    use crate::error::GceError;

    fn client(server: &mockito::Server) -> Client {
        Client::new("p", TokenSource::Static("tok".to_string())).with_base_url(server.url())
    }

    #[test]
    fn resolves_family_to_self_link() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock(
                "GET",
                "/projects/ubuntu-os-cloud/global/images/family/ubuntu-2204-lts",
            )
            .with_status(200)
            .with_body(
                r#"{"name":"ubuntu-2204-jammy-v20240301","selfLink":"https://compute.googleapis.com/compute/v1/projects/ubuntu-os-cloud/global/images/ubuntu-2204-jammy-v20240301"}"#,
            )
            .create();

        let image = client(&server)
            .image_from_family("ubuntu-os-cloud", "ubuntu-2204-lts")
            .unwrap();
        assert_eq!(image.name, "ubuntu-2204-jammy-v20240301");
        assert!(image.self_link.ends_with("ubuntu-2204-jammy-v20240301"));
    }

    #[test]
    fn unknown_family_is_an_api_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/projects/ubuntu-os-cloud/global/images/family/nope")
            .with_status(404)
            .create();

        let err = client(&server)
            .image_from_family("ubuntu-os-cloud", "nope")
            .unwrap_err();
        assert!(matches!(err, GceError::Api { status: 404, .. }));
    }
}
