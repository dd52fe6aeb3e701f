use regex::Regex;
use std::{collections::HashMap, sync::OnceLock};

/// Todo lo que no es letra, dígito, `_` o espacio se reemplaza por espacio.
/// Las marcas combinantes (p. ej. U+0301) también cortan la palabra.
fn non_word_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\p{L}\p{N}_\s]").expect("regex de puntuación inválida"))
}

/// Normaliza una línea: minúsculas y puntuación -> espacio.
pub fn normalize_line(line: &str) -> String {
    non_word_chars()
        .replace_all(&line.to_lowercase(), " ")
        .into_owned()
}

/* =========================
   Mapper
   ========================= */

/// Secuencia perezosa de pares (token, 1) para una línea.
pub struct MappedTokens {
    text: String,
    pos: usize,
}

impl Iterator for MappedTokens {
    type Item = (String, u64);

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.text[self.pos..];
        let start = rest.find(|c: char| !c.is_whitespace())?;
        let token_and_tail = &rest[start..];
        let len = token_and_tail
            .find(char::is_whitespace)
            .unwrap_or(token_and_tail.len());

        let token = token_and_tail[..len].to_string();
        self.pos += start + len;
        Some((token, 1))
    }
}

/// Mapper de WordCount: una línea de texto -> (token, 1) por cada palabra.
/// Las líneas vacías (tras trim) no emiten nada.
pub fn map_line(line: &str) -> MappedTokens {
    let line = line.trim();
    let text = if line.is_empty() {
        String::new()
    } else {
        normalize_line(line)
    };

    MappedTokens { text, pos: 0 }
}

/* =========================
   Formato intermedio "palabra\tconteo"
   ========================= */

pub fn format_record(word: &str, count: u64) -> String {
    format!("{}\t{}", word, count)
}

/// Parsea una línea `palabra\tconteo`. Devuelve None si no tiene
/// exactamente dos campos o si el conteo no es un entero.
pub fn parse_record(line: &str) -> Option<(&str, u64)> {
    let mut fields = line.split('\t');
    let word = fields.next()?;
    let count = fields.next()?;
    if fields.next().is_some() {
        return None;
    }
    count.trim().parse::<u64>().ok().map(|c| (word, c))
}

/* =========================
   Reducer
   ========================= */

/// Reducer en streaming: asume que las claves iguales llegan contiguas
/// (orden garantizado por el shuffle del motor). No es un agregador
/// general para entradas desordenadas.
pub struct GroupedSum<I> {
    lines: I,
    current: Option<(String, u64)>,
}

impl<I, S> Iterator for GroupedSum<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = (String, u64);

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            let Some((word, count)) = parse_record(line.as_ref().trim()) else {
                // línea mal formada: se ignora
                continue;
            };

            if let Some((current_word, total)) = self.current.as_mut() {
                if current_word.as_str() == word {
                    *total = total.saturating_add(count);
                    continue;
                }
            }

            // cambio de clave: se emite el grupo anterior
            let finished = self.current.replace((word.to_string(), count));
            if finished.is_some() {
                return finished;
            }
        }

        self.current.take()
    }
}

pub fn reduce_sorted<I>(lines: I) -> GroupedSum<I::IntoIter>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    GroupedSum {
        lines: lines.into_iter(),
        current: None,
    }
}

/// Conteo directo en memoria, sin pasar por el formato intermedio.
pub fn count_words(text: &str) -> HashMap<String, u64> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for line in text.lines() {
        for (token, n) in map_line(line) {
            *counts.entry(token).or_insert(0) += n;
        }
    }
    counts
}
