//! Test fixture: writes small ZIM archives on the fly.

#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;
use tempfile::NamedTempFile;

const MAGIC: u32 = 72173914;
const NO_PAGE: u32 = 0xFFFF_FFFF;
const CLUSTERS: usize = 2;

enum Kind {
    Content { mime: String, data: Vec<u8> },
    Redirect { ns: char, url: String },
}

struct Entry {
    ns: char,
    url: String,
    title: String,
    kind: Kind,
}

impl Entry {
    fn key(&self) -> (char, &str) {
        (self.ns, self.url.as_str())
    }
}

/// Builder for a ZIM archive with two clusters
pub struct ZimFixture {
    entries: Vec<Entry>,
    main_page: Option<(char, String)>,
    zstd: bool,
}

impl Default for ZimFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ZimFixture {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            main_page: None,
            zstd: false,
        }
    }

    /// An HTML article whose body links to each of `hrefs`
    pub fn article(self, ns: char, url: &str, title: &str, hrefs: &[&str]) -> Self {
        let mut html = format!("<html><head><title>{}</title></head><body>", title);
        for href in hrefs {
            html.push_str(&format!("<p><a href=\"{}\">link</a></p>", href));
        }
        html.push_str("</body></html>");
        self.content(ns, url, title, "text/html", html.as_bytes())
    }

    pub fn content(mut self, ns: char, url: &str, title: &str, mime: &str, data: &[u8]) -> Self {
        self.entries.push(Entry {
            ns,
            url: url.to_string(),
            title: title.to_string(),
            kind: Kind::Content {
                mime: mime.to_string(),
                data: data.to_vec(),
            },
        });
        self
    }

    pub fn redirect(mut self, ns: char, url: &str, target_ns: char, target_url: &str) -> Self {
        self.entries.push(Entry {
            ns,
            url: url.to_string(),
            title: String::new(),
            kind: Kind::Redirect {
                ns: target_ns,
                url: target_url.to_string(),
            },
        });
        self
    }

    pub fn main_page(mut self, ns: char, url: &str) -> Self {
        self.main_page = Some((ns, url.to_string()));
        self
    }

    pub fn zstd(mut self) -> Self {
        self.zstd = true;
        self
    }

    /// Serialize the archive.
    pub fn build(mut self) -> Vec<u8> {
        self.entries.sort_by(|a, b| a.key().cmp(&b.key()));
        let index_of = |ns: char, url: &str| -> u32 {
            self.entries
                .iter()
                .position(|e| e.key() == (ns, url))
                .unwrap_or_else(|| panic!("fixture has no entry {}/{}", ns, url)) as u32
        };

        // MIME list
        let mut mimes: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if let Kind::Content { mime, .. } = &entry.kind {
                if !mimes.contains(&mime.as_str()) {
                    mimes.push(mime);
                }
            }
        }
        let mut mime_list: Vec<u8> = Vec::new();
        for mime in &mimes {
            mime_list.extend_from_slice(mime.as_bytes());
            mime_list.push(0);
        }
        mime_list.push(0);

        // Blobs spread over the clusters in entry order
        let mut cluster_blobs: Vec<Vec<&[u8]>> = vec![Vec::new(); CLUSTERS];
        let mut locations = Vec::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if let Kind::Content { data, .. } = &entry.kind {
                let cluster = i % CLUSTERS;
                locations.push(Some((cluster as u32, cluster_blobs[cluster].len() as u32)));
                cluster_blobs[cluster].push(data);
            } else {
                locations.push(None);
            }
        }

        // Directory entries
        let mut dirents = Vec::new();
        for (entry, location) in self.entries.iter().zip(&locations) {
            let mut d: Vec<u8> = Vec::new();
            match &entry.kind {
                Kind::Content { mime, .. } => {
                    let mime_index = mimes.iter().position(|m| *m == mime.as_str()).unwrap() as u16;
                    let (cluster, blob) = location.unwrap();
                    d.write_u16::<LittleEndian>(mime_index).unwrap();
                    d.write_u8(0).unwrap();
                    d.write_u8(entry.ns as u8).unwrap();
                    d.write_u32::<LittleEndian>(0).unwrap();
                    d.write_u32::<LittleEndian>(cluster).unwrap();
                    d.write_u32::<LittleEndian>(blob).unwrap();
                }
                Kind::Redirect { ns, url } => {
                    d.write_u16::<LittleEndian>(0xFFFF).unwrap();
                    d.write_u8(0).unwrap();
                    d.write_u8(entry.ns as u8).unwrap();
                    d.write_u32::<LittleEndian>(0).unwrap();
                    d.write_u32::<LittleEndian>(index_of(*ns, url)).unwrap();
                }
            }
            d.extend_from_slice(entry.url.as_bytes());
            d.push(0);
            d.extend_from_slice(entry.title.as_bytes());
            d.push(0);
            dirents.push(d);
        }

        // Clusters
        let clusters: Vec<Vec<u8>> = cluster_blobs
            .iter()
            .map(|blobs| {
                let mut payload: Vec<u8> = Vec::new();
                let mut offset = ((blobs.len() + 1) * 4) as u32;
                payload.write_u32::<LittleEndian>(offset).unwrap();
                for blob in blobs {
                    offset += blob.len() as u32;
                    payload.write_u32::<LittleEndian>(offset).unwrap();
                }
                for blob in blobs {
                    payload.extend_from_slice(blob);
                }

                if self.zstd {
                    let mut raw = vec![5u8];
                    raw.extend(zstd::stream::encode_all(&payload[..], 3).unwrap());
                    raw
                } else {
                    let mut raw = vec![1u8];
                    raw.extend(payload);
                    raw
                }
            })
            .collect();

        // Layout
        let n = self.entries.len() as u64;
        let mime_list_pos = 80u64;
        let url_ptr_pos = mime_list_pos + mime_list.len() as u64;
        let title_ptr_pos = url_ptr_pos + 8 * n;
        let dirents_pos = title_ptr_pos + 4 * n;
        let cluster_ptr_pos = dirents_pos + dirents.iter().map(|d| d.len() as u64).sum::<u64>();
        let clusters_pos = cluster_ptr_pos + 8 * CLUSTERS as u64;
        let checksum_pos = clusters_pos + clusters.iter().map(|c| c.len() as u64).sum::<u64>();

        let main_page = self
            .main_page
            .as_ref()
            .map(|(ns, url)| index_of(*ns, url))
            .unwrap_or(NO_PAGE);

        let mut out: Vec<u8> = Vec::new();
        out.write_u32::<LittleEndian>(MAGIC).unwrap();
        out.write_u16::<LittleEndian>(6).unwrap();
        out.write_u16::<LittleEndian>(1).unwrap();
        out.extend_from_slice(&[0xAB; 16]);
        out.write_u32::<LittleEndian>(n as u32).unwrap();
        out.write_u32::<LittleEndian>(CLUSTERS as u32).unwrap();
        out.write_u64::<LittleEndian>(url_ptr_pos).unwrap();
        out.write_u64::<LittleEndian>(title_ptr_pos).unwrap();
        out.write_u64::<LittleEndian>(cluster_ptr_pos).unwrap();
        out.write_u64::<LittleEndian>(mime_list_pos).unwrap();
        out.write_u32::<LittleEndian>(main_page).unwrap();
        out.write_u32::<LittleEndian>(NO_PAGE).unwrap();
        out.write_u64::<LittleEndian>(checksum_pos).unwrap();
        assert_eq!(out.len(), 80);

        out.extend_from_slice(&mime_list);

        let mut pos = dirents_pos;
        for d in &dirents {
            out.write_u64::<LittleEndian>(pos).unwrap();
            pos += d.len() as u64;
        }

        let mut by_title: Vec<usize> = (0..self.entries.len()).collect();
        by_title.sort_by_key(|&i| {
            let e = &self.entries[i];
            let title = if e.title.is_empty() { &e.url } else { &e.title };
            (e.ns, title.clone())
        });
        for i in by_title {
            out.write_u32::<LittleEndian>(i as u32).unwrap();
        }

        for d in &dirents {
            out.extend_from_slice(d);
        }

        let mut pos = clusters_pos;
        for c in &clusters {
            out.write_u64::<LittleEndian>(pos).unwrap();
            pos += c.len() as u64;
        }
        for c in &clusters {
            out.extend_from_slice(c);
        }

        assert_eq!(out.len() as u64, checksum_pos);
        out.extend_from_slice(&[0u8; 16]);
        out
    }

    /// Serialize into a temporary file.
    pub fn write(self) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&self.build()).unwrap();
        file.flush().unwrap();
        file
    }
}

/// A small wiki: a main page, one category, a redirect, an image and an
/// article whose title looks like an ID.
pub fn animals() -> ZimFixture {
    ZimFixture::new()
        .article(
            'C',
            "Main_Page",
            "Main Page",
            &["Category:Animals", "Dog", "https://example.org/", "#top", "Main_Page"],
        )
        .article(
            'C',
            "Category:Animals",
            "",
            &["Dog", "Cat", "Puppy", "Nowhere", "mailto:zoo@example.org"],
        )
        .article('C', "Dog", "", &["Cat", "../Cat#Diet", "Kennel?view=1"])
        .article('C', "Cat", "", &["Dog", "42"])
        .article('C', "Kennel", "", &[])
        .article('C', "42", "42", &["Dog"])
        .redirect('C', "Puppy", 'C', "Dog")
        .content('C', "logo.png", "", "image/png", b"\x89PNG fake")
        .redirect('W', "mainPage", 'C', "Main_Page")
        .main_page('W', "mainPage")
}
