use include_dir::{include_dir, Dir};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::SourceError;
use crate::model::Question;
use crate::source::QuestionSource;

static DATA_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/data");

const BUNDLED_FILE: &str = "movies.json";

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Movie {
    pub title: String,
    pub image: String,
    pub rating: f32,
}

#[allow(dead_code)]
#[derive(Deserialize, Clone, Debug)]
struct MovieList {
    name: String,
    movies: Vec<Movie>,
}

/// Where movie records come from
pub trait MoviesLoader {
    fn load_movies(&self) -> Result<Vec<Movie>, SourceError>;
}

/// Movie list compiled into the binary
#[derive(Debug, Default, Clone, Copy)]
pub struct BundledMoviesLoader;

impl MoviesLoader for BundledMoviesLoader {
    fn load_movies(&self) -> Result<Vec<Movie>, SourceError> {
        let file = DATA_DIR
            .get_file(BUNDLED_FILE)
            .ok_or_else(|| SourceError::Load("bundled movie list is missing".to_string()))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| SourceError::Load("bundled movie list is not UTF-8".to_string()))?;
        parse_movies(contents)
    }
}

/// Movie list read from a JSON file on disk
#[derive(Debug, Clone)]
pub struct FileMoviesLoader {
    path: PathBuf,
}

impl FileMoviesLoader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl MoviesLoader for FileMoviesLoader {
    fn load_movies(&self) -> Result<Vec<Movie>, SourceError> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            SourceError::Load(format!(
                "could not read questions from {}: {}",
                self.path.display(),
                e
            ))
        })?;
        parse_movies(&contents)
    }
}

fn parse_movies(contents: &str) -> Result<Vec<Movie>, SourceError> {
    let list: MovieList = serde_json::from_str(contents)?;
    if list.movies.is_empty() {
        return Err(SourceError::Load("the movie list is empty".to_string()));
    }
    Ok(list.movies)
}

/// Builds "is the rating greater than N" questions from random movies
pub struct MovieQuestionFactory {
    loader: Box<dyn MoviesLoader + Send>,
    movies: Vec<Movie>,
    rng: StdRng,
}

impl MovieQuestionFactory {
    pub fn new(loader: Box<dyn MoviesLoader + Send>) -> Self {
        Self {
            loader,
            movies: Vec::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic question order for a given seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }
}

impl QuestionSource for MovieQuestionFactory {
    fn load_data(&mut self) -> Result<(), SourceError> {
        self.movies = self.loader.load_movies()?;
        info!(count = self.movies.len(), "movies loaded");
        Ok(())
    }

    fn request_next_question(&mut self) -> Option<Question> {
        let movie = self.movies.choose(&mut self.rng)?.clone();
        let threshold: u8 = self.rng.gen_range(6..=8);
        debug!(title = %movie.title, threshold, "question built");

        Some(Question::new(
            movie.image,
            format!("Is the rating of this movie greater than {threshold}?"),
            movie.rating > f32::from(threshold),
        ))
    }
}
