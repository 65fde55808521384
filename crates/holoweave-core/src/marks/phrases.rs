//! Phrase pools for text marks, each drawn through its own shuffle-bag.

use crate::modes::{TextSource, Theme};
use crate::rng::EngineRng;

pub const ORIGINAL: &[&str] = &[
    "H O L O W O R L D S",
    "SIGNAL // NOISE",
    "DIAGRAM OF A DREAM",
    "ECHOES IN GLASS",
    "SYSTEMS / SOULS",
    "NOTES FROM TOMORROW",
    "CHROMA MEMORY",
    "ERRORS AS ORNAMENT",
    "THIS IS A BLUEPRINT",
    "GLITCH IS LANGUAGE",
    "DRAW THE INVISIBLE",
    "GHOST IN THE GRID",
    "PHOSPHOR DREAMS",
    "PRISMATIC STATIC",
    "AFTERIMAGE ARCHIVE",
    "PIXEL SERMON",
    "ELECTRIC LULLABY",
    "SPECTRAL SCHEMATICS",
];

pub const DESIGN_80S: &[&str] = &[
    "VHS TRACKING",
    "TRACKING...",
    "SCANLINES // ON",
    "PAL / NTSC",
    "CATHODE RAY",
    "CRT PHOSPHOR",
    "VECTOR WIREFRAME",
    "NEON GRID HORIZON",
    "ANALOG GLOW",
    "CHROME TYPE",
    "CASSETTE TAPE",
    "SIDE A / SIDE B",
    "AUTO-REVERSE",
    "TAPE HISS",
    "CASSETTE CLICK",
    "VINYL CRACKLE",
    "FLOPPY DISK 3.5",
    "POLAROID FLASH",
    "LASERDISC",
    "COMPACT DISC",
    "BOOMBOX BLAST",
    "BRICK PHONE",
    "BEEPER // PAGER",
    "DOT-MATRIX PRINT",
    "DIAL TONE",
    "INSERT COIN",
    "ARCADE // HI-SCORE",
    "ARCADE TOKENS",
    "8-BIT CONSOLE",
    "PRESS START",
    "LEVEL UP!",
    "PAUSE // REWIND",
    "FAST FORWARD",
    "MIDI // CLOCK",
    "GATED SNARE",
    "CHORUS PEDAL",
    "REVERB TAIL",
    "FM STEREO",
    "TOP 40 RADIO",
    "RADIO EDIT",
    "MAXI-SINGLE 12-INCH",
    "ACID WASH",
    "BOXY BLAZER",
    "SHOULDER PADS",
    "HAIRSPRAY CLOUD",
    "HYPERCOLOR",
    "RADICAL",
    "FANNY PACK",
    "ROLLER RINK",
    "MALL FOOD COURT",
    "SATURDAY MORNING",
    "NEON SUNSET",
    "CHERRY COLA",
    "BUBBLEGUM POP",
    "STICKER BOOK",
    "ADMIT ONE",
    "MATINEE",
    "BOGUS",
    "ROW A",
    "SEAT 12",
    "DANCE FLOOR",
    "TOTAL RAD",
    "NEON NIGHTS",
    "REC *",
    "PSYCH!",
    "WHOA!",
    "BAM!",
    "LIKE, TOTALLY",
    "BODACIOUS",
    "CHILL PILL",
];

pub const HOOKS_80S: &[&str] = &[
    "TAKE ON ME",
    "SWEET DREAMS",
    "PURPLE RAIN",
    "1999",
    "TIME AFTER TIME",
    "TAINTED LOVE",
    "BLUE MONDAY",
    "RIO",
    "THE FINAL COUNTDOWN",
    "EYE OF THE TIGER",
    "THE POWER OF LOVE",
    "DANCING IN THE DARK",
    "TRUE COLORS",
    "DANGER ZONE",
    "WHO YOU GONNA CALL",
    "WAX ON",
    "WAX OFF",
    "EXCELLENT!",
    "GET A CLUE",
    "PARTY ON",
    "IT'S SHOWTIME!",
    "I WANT MY MTV",
    "STAND BY ME",
    "AFTER HOURS",
    "FIZZ, FIZZ",
];

/// One phrase pool plus the indices still waiting in its bag.
#[derive(Debug, Clone)]
struct PhraseBag {
    pool: &'static [&'static str],
    bag: Vec<usize>,
}

impl PhraseBag {
    const fn new(pool: &'static [&'static str]) -> Self {
        Self {
            pool,
            bag: Vec::new(),
        }
    }

    fn draw(&mut self, rng: &mut EngineRng) -> &'static str {
        if self.pool.is_empty() {
            return "";
        }
        if self.bag.is_empty() {
            self.bag = (0..self.pool.len()).collect();
            rng.shuffle(&mut self.bag);
        }
        self.bag.pop().map_or("", |i| self.pool[i])
    }
}

/// Per-pool bags for every text source.
#[derive(Debug, Clone)]
pub struct PhrasePicker {
    design: PhraseBag,
    original: PhraseBag,
    hooks: PhraseBag,
}

impl Default for PhrasePicker {
    fn default() -> Self {
        Self {
            design: PhraseBag::new(DESIGN_80S),
            original: PhraseBag::new(ORIGINAL),
            hooks: PhraseBag::new(HOOKS_80S),
        }
    }
}

impl PhrasePicker {
    /// Next phrase for the given source.
    ///
    /// With the theme off only the original pool is used. `Mixed` chooses a
    /// pool with probability proportional to its size.
    pub fn pick(&mut self, source: TextSource, theme: Theme, rng: &mut EngineRng) -> &'static str {
        if !theme.is_eighties() {
            return self.original.draw(rng);
        }
        match source {
            TextSource::Design80s => self.design.draw(rng),
            TextSource::Original => self.original.draw(rng),
            TextSource::Hooks80s => self.hooks.draw(rng),
            TextSource::Mixed => {
                let a = DESIGN_80S.len() as f64;
                let b = ORIGINAL.len() as f64;
                let total = a + b + HOOKS_80S.len() as f64;
                let r = rng.next_f64() * total;
                if r < a {
                    self.design.draw(rng)
                } else if r < a + b {
                    self.original.draw(rng)
                } else {
                    self.hooks.draw(rng)
                }
            }
        }
    }
}
