use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use tokio::process::Command;

use crate::{types::canonical_watch_url, yt::AudioHandler};

/// Downloads audio by running the `yt-dlp` executable, which needs `ffmpeg`
/// on the `PATH` to extract mp3.
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl YtDlp {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Arguments for a mono, low-bitrate mp3 of `video_id` written to
    /// `{audio_dl_path}/{video_id}.mp3`. The bitrate keeps an hour of speech
    /// under the transcription upload limit.
    pub fn download_args(video_id: &str, audio_dl_path: &Path) -> Vec<String> {
        let output_template = audio_dl_path.join(format!("{video_id}.%(ext)s"));
        vec![
            "--quiet".into(),
            "--no-playlist".into(),
            "--format".into(),
            "bestaudio/best".into(),
            "--extract-audio".into(),
            "--audio-format".into(),
            "mp3".into(),
            "--postprocessor-args".into(),
            "ExtractAudio:-ac 1 -b:a 32k".into(),
            "--output".into(),
            output_template.to_string_lossy().into_owned(),
            canonical_watch_url(video_id),
        ]
    }
}

impl AudioHandler for YtDlp {
    #[tracing::instrument(skip(self, audio_dl_path))]
    async fn download(&self, video_id: &str, audio_dl_path: &Path) -> anyhow::Result<PathBuf> {
        let audio_mp3_path = audio_dl_path.join(format!("{video_id}.mp3"));

        let output = Command::new(&self.binary)
            .args(Self::download_args(video_id, audio_dl_path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to spawn {}: {e}", self.binary.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp exited with {}: {}", output.status, stderr.trim());
        }

        if !audio_mp3_path.exists() {
            anyhow::bail!(
                "yt-dlp did not produce expected file: {}",
                audio_mp3_path.display()
            );
        }
        Ok(audio_mp3_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downloads_mp3_named_after_the_video() {
        let args = YtDlp::download_args("abc12345678", Path::new("/tmp/work"));
        assert_eq!(
            args.last().map(String::as_str),
            Some("https://www.youtube.com/watch?v=abc12345678")
        );
        assert!(args.contains(&"/tmp/work/abc12345678.%(ext)s".to_string()));
        assert!(args.windows(2).any(|w| w == ["--audio-format", "mp3"]));
    }

    #[tokio::test]
    async fn missing_binary_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = YtDlp::new("/nonexistent/yt-dlp")
            .download("abc12345678", dir.path())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to spawn"), "{err}");
    }
}
