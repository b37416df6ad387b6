//! Static catalog of the 52 idols that per-subject events rank separately.

use serde::Serialize;

/// Highest idol id; ids run 1..=IDOL_COUNT.
pub const IDOL_COUNT: u32 = 52;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdolInfo {
    pub id: u32,
    pub name: &'static str,
    pub short_name: &'static str,
    pub color: &'static str,
}

const fn idol(id: u32, name: &'static str, short_name: &'static str, color: &'static str) -> IdolInfo {
    IdolInfo {
        id,
        name,
        short_name,
        color,
    }
}

static IDOLS: [IdolInfo; IDOL_COUNT as usize] = [
    idol(1, "Haruka Amami", "Haruka", "#e22b30"),
    idol(2, "Chihaya Kisaragi", "Chihaya", "#2743d2"),
    idol(3, "Miki Hoshii", "Miki", "#b4e04b"),
    idol(4, "Yukiho Hagiwara", "Yukiho", "#d3dde9"),
    idol(5, "Yayoi Takatsuki", "Yayoi", "#f39939"),
    idol(6, "Makoto Kikuchi", "Makoto", "#515558"),
    idol(7, "Iori Minase", "Iori", "#fd99e1"),
    idol(8, "Takane Shijou", "Takane", "#a6126a"),
    idol(9, "Ritsuko Akizuki", "Ritsuko", "#01a860"),
    idol(10, "Azusa Miura", "Azusa", "#9238be"),
    idol(11, "Ami Futami", "Ami", "#ffe43f"),
    idol(12, "Mami Futami", "Mami", "#ffe43f"),
    idol(13, "Hibiki Ganaha", "Hibiki", "#01adb9"),
    idol(14, "Mirai Kasuga", "Mirai", "#ea5b76"),
    idol(15, "Shizuka Mogami", "Shizuka", "#6495cf"),
    idol(16, "Tsubasa Ibuki", "Tsubasa", "#fed552"),
    idol(17, "Kotoha Tanaka", "Kotoha", "#92cfbb"),
    idol(18, "Elena Shimabara", "Elena", "#9bce92"),
    idol(19, "Minako Satake", "Minako", "#58a6dc"),
    idol(20, "Megumi Tokoro", "Megumi", "#454341"),
    idol(21, "Matsuri Tokugawa", "Matsuri", "#5abfb7"),
    idol(22, "Serika Hakozaki", "Serika", "#ed90ba"),
    idol(23, "Akane Nonohara", "Akane", "#eb613f"),
    idol(24, "Anna Mochizuki", "Anna", "#7e6ca8"),
    idol(25, "Roco", "Roco", "#fff03c"),
    idol(26, "Yuriko Nanao", "Yuriko", "#c7b83c"),
    idol(27, "Sayoko Takayama", "Sayoko", "#7f6575"),
    idol(28, "Arisa Matsuda", "Arisa", "#b54461"),
    idol(29, "Umi Kousaka", "Umi", "#e9739b"),
    idol(30, "Iku Nakatani", "Iku", "#f7e78e"),
    idol(31, "Tomoka Tenkubashi", "Tomoka", "#bee3e3"),
    idol(32, "Emily Stewart", "Emily", "#554171"),
    idol(33, "Shiho Kitazawa", "Shiho", "#afa690"),
    idol(34, "Ayumu Maihama", "Ayumu", "#e25a9b"),
    idol(35, "Hinata Kinoshita", "Hinata", "#d1342c"),
    idol(36, "Kana Yabuki", "Kana", "#f5ad3b"),
    idol(37, "Nao Yokoyama", "Nao", "#788bc5"),
    idol(38, "Chizuru Nikaido", "Chizuru", "#f19557"),
    idol(39, "Konomi Baba", "Konomi", "#f1becb"),
    idol(40, "Tamaki Ogami", "Tamaki", "#ee762e"),
    idol(41, "Fuka Toyokawa", "Fuka", "#7278a8"),
    idol(42, "Miya Miyao", "Miya", "#d7a96b"),
    idol(43, "Noriko Fukuda", "Noriko", "#eceb70"),
    idol(44, "Mizuki Makabe", "Mizuki", "#99b7dc"),
    idol(45, "Karen Shinomiya", "Karen", "#b63b40"),
    idol(46, "Rio Momose", "Rio", "#f19591"),
    idol(47, "Subaru Nagayoshi", "Subaru", "#aeb49c"),
    idol(48, "Reika Kitakami", "Reika", "#6bb6b0"),
    idol(49, "Momoko Suou", "Momoko", "#efb864"),
    idol(50, "Julia", "Julia", "#d7385f"),
    idol(51, "Tsumugi Shiraishi", "Tsumugi", "#ebe1ff"),
    idol(52, "Kaori Sakuramori", "Kaori", "#274079"),
];

/// All idols in id order.
pub fn all() -> &'static [IdolInfo] {
    &IDOLS
}

pub fn by_id(id: u32) -> Option<&'static IdolInfo> {
    if id == 0 || id > IDOL_COUNT {
        return None;
    }
    IDOLS.get(id as usize - 1)
}

/// Display label for a prediction subject; 0 is the whole event.
pub fn subject_label(subject_id: u32) -> &'static str {
    match subject_id {
        0 => "Event",
        id => by_id(id).map(|i| i.short_name).unwrap_or("Unknown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_are_dense() {
        for (i, idol) in all().iter().enumerate() {
            assert_eq!(idol.id as usize, i + 1);
            assert!(idol.color.starts_with('#') && idol.color.len() == 7);
        }
    }

    #[test]
    fn test_lookup_bounds() {
        assert!(by_id(0).is_none());
        assert!(by_id(53).is_none());
        assert_eq!(by_id(1).unwrap().short_name, "Haruka");
        assert_eq!(by_id(52).unwrap().short_name, "Kaori");
    }

    #[test]
    fn test_subject_label() {
        assert_eq!(subject_label(0), "Event");
        assert_eq!(subject_label(14), "Mirai");
        assert_eq!(subject_label(99), "Unknown");
    }
}
