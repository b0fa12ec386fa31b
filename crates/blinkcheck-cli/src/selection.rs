//! Video-selection flags shared by every pipeline stage.

use blinkcheck_db::{Database, Protocol, SupportFilter, VideoClass, VideoEntry};

#[derive(clap::Args, Debug, Clone, Copy)]
pub struct Selection {
    /// Protocol subselecting the attacks to operate on.
    #[arg(short, long, default_value = "grandtest")]
    pub protocol: Protocol,

    /// Annotation support to use: fixed, hand or hand+fixed.
    #[arg(short, long, default_value = "hand+fixed")]
    pub support: SupportFilter,
}

impl Selection {
    /// All admitted videos in every group and class.
    pub fn everything<'a>(&self, db: &'a Database) -> Vec<&'a VideoEntry> {
        db.videos(
            self.protocol,
            self.support,
            &blinkcheck_db::Group::ALL,
            &VideoClass::ALL,
        )
    }
}
