// Static copy, asset paths and the loaded image handles shared by screens.

use bevy::prelude::*;

pub struct Memory {
    pub text: &'static str,
    pub photo: &'static str,
}

pub const MEMORIES: [Memory; 4] = [
    Memory {
        text: "Every moment with you is magical",
        photo: "1.jpeg",
    },
    Memory {
        text: "You make my heart smile",
        photo: "2.jpeg",
    },
    Memory {
        text: "You're my favorite person",
        photo: "3.jpeg",
    },
    Memory {
        text: "Dreams come true with you",
        photo: "4.jpeg",
    },
];

pub const MEME_PATHS: [&str; 5] = [
    "meme/1.jpeg",
    "meme/2.jpeg",
    "meme/3.jpeg",
    "meme/4.jpg",
    "meme/5.jpeg",
];

pub const TRACK_PATH: &str = "songs/1st.ogg";

pub const VIDEO_EMBED: &str =
    "https://www.youtube.com/embed/8QQCMvRI_oI?autoplay=1&modestbranding=1&rel=0&showinfo=0";

pub const MESSAGE: &str = "A lot of people will wish you today, but I want to say something different. I don't just appreciate you, I genuinely feel lucky that you're in my life.

Your presence has this quiet power. No matter how heavy my day feels, one call from you, one simple \"haan,\" and everything settles. You don't even realize how much strength your words give me. The way you guide me, support me, and stand beside me keeps me steady more than you know.

And the way you care... the way you get protective sometimes never feels restricting. It feels reassuring. It feels like someone genuinely wants the best for me. When you stop me, question me, or think twice before saying yes, I know it's not about control. It's because you're thinking about my safety, my future, my well-being.

Whenever I ask you for permission, it's not just a habit. It's trust. I want you to think properly and then tell me what is right and what isn't. I don't want blind possessiveness, I want your real judgment. And you always give that. That's why it matters.

And about studies... I don't think anyone pushes me the way you do. Sometimes even more than I push myself. The way you remind me, scold me, motivate me is not pressure, it's care. You want me to become something. You want me to stand strong on my own. And I see that.

Even when your mind is full of deadlines, responsibilities and pressure, your voice with me is calm. You never make me feel like an option. You make time. And that effort is everything.

Our Kumaoni talks, our random teasing, our \"haan re,\" our silly laughter feel natural. Easy. Real. Nothing forced. Just us.

And that's something I will never take lightly.

So on your birthday, I just want you to know I'm grateful for you. Not loudly. Not dramatically. Just truly.

Stay the same.
And yes... keep scolding me to study. I probably need it.

Happy Birthday";

/// Image handles for every screen. Empty when no asset server is present,
/// in which case screens fall back to default handles.
#[derive(Resource, Default)]
pub struct ScreenAssets {
    pub photos: Vec<Handle<Image>>,
    pub memes: Vec<Handle<Image>>,
}

impl ScreenAssets {
    pub fn load(asset_server: &AssetServer) -> Self {
        Self {
            photos: MEMORIES
                .iter()
                .map(|memory| asset_server.load(memory.photo))
                .collect(),
            memes: MEME_PATHS
                .iter()
                .map(|path| asset_server.load(*path))
                .collect(),
        }
    }

    pub fn photo(&self, index: usize) -> Handle<Image> {
        self.photos.get(index).cloned().unwrap_or_default()
    }

    pub fn meme(&self, index: usize) -> Handle<Image> {
        self.memes.get(index).cloned().unwrap_or_default()
    }
}

pub struct ContentPlugin;

impl Plugin for ContentPlugin {
    fn build(&self, app: &mut App) {
        // Loaded at build time so the first screen can use the handles on
        // its initial OnEnter.
        let assets = app
            .world()
            .get_resource::<AssetServer>()
            .map(ScreenAssets::load)
            .unwrap_or_default();
        app.insert_resource(assets);
    }
}
