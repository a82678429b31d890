//! Canned-reply chat: an ordered keyword table, first match wins.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Greetings,
    Services,
    Contact,
    Price,
    About,
    Thanks,
    Default,
}

/// Checked top to bottom.
const KEYWORDS: &[(Topic, &[&str])] = &[
    (Topic::Greetings, &["สวัสดี", "หวัดดี", "hello", "hi", "ดี", "หวัด"]),
    (
        Topic::Services,
        &[
            "บริการ", "ทำอะไร", "มีอะไรบ้าง", "service", "ทำได้", "รับทำ", "ภาพ", "อนิเมชั่น", "เพลง",
            "animation",
        ],
    ),
    (
        Topic::Contact,
        &["ติดต่อ", "เบอร์", "โทร", "email", "อีเมล", "facebook", "ig", "line", "contact"],
    ),
    (Topic::Price, &["ราคา", "เท่าไหร่", "ค่า", "price", "cost", "งบ", "ตังค์"]),
    (Topic::About, &["เกี่ยวกับ", "คือใคร", "ประวัติ", "about", "who", "ประสบการณ์"]),
    (Topic::Thanks, &["ขอบคุณ", "thanks", "thank", "thx", "ขอบใจ", "ok", "โอเค"]),
];

const GREETINGS: &[&str] = &[
    "สวัสดีค่ะ! 🌸 ยินดีต้อนรับสู่ POFSTUDIO ช่วยอะไรได้บ้างคะ?",
    "หวัดดีค่ะ! 💕 มีอะไรให้ช่วยไหมคะ?",
    "สวัสดีค่ะ! 🎨 POFSTUDIO พร้อมช่วยเหลือคุณค่ะ",
];

const SERVICES: &[&str] = &[
    "POFSTUDIO มีบริการหลากหลายค่ะ:\n\n🖼️ **POFIMAGE** - ภาพประกอบน่ารัก\n🎬 **POFANIMATION** - อนิเมชั่น\n🎵 **POFSONG** - เพลงและดนตรี\n📚 **POFFRIEND** - สื่อการสอนเด็ก\n🛒 **POFSHOP** - สินค้าน่ารัก\n\nสนใจบริการไหนเป็นพิเศษคะ?",
];

const CONTACT: &[&str] = &[
    "ติดต่อเราได้หลายช่องทางค่ะ:\n\n📧 Email: poffog@gmail.com\n📘 Facebook: POFSTUDIO\n📷 Instagram: @that.isnotlove\n🎬 YouTube: @PofStudio\n🎵 TikTok: @princeofhug\n\nหรือกดปุ่ม \"ส่งอีเมล\" ด้านบนได้เลยค่ะ!",
];

const PRICE: &[&str] = &[
    "ราคาขึ้นอยู่กับขอบเขตงานค่ะ 💰\n\nกรุณาส่งรายละเอียดงานมาทาง Email: poffog@gmail.com\nแล้วเราจะตอบกลับพร้อมใบเสนอราคาค่ะ! 📝",
];

const ABOUT: &[&str] = &[
    "POFSTUDIO คือสตูดิโอสร้างสรรค์ผลงานน่ารักสำหรับเด็ก 🌈\n\nเราทำงานด้านกราฟิก อนิเมชั่น เพลง และสื่อการเรียนรู้มากว่า 5 ปี\n\n✨ ผลงาน 100+ ชิ้น\n📦 โปรเจกต์ 50+ งาน\n💕 ลูกค้าน่ารักมากมาย",
];

const THANKS: &[&str] = &[
    "ยินดีค่ะ! 💕 มีอะไรถามเพิ่มเติมได้เสมอนะคะ",
    "ด้วยความยินดีค่ะ! 🌸 ขอบคุณที่สนใจ POFSTUDIO",
    "ไม่เป็นไรค่ะ! 😊 ติดต่อมาได้ตลอดเลยนะคะ",
];

const DEFAULT: &[&str] = &[
    "ขอบคุณสำหรับข้อความค่ะ! 😊\n\nหากต้องการสอบถามเพิ่มเติม กรุณาติดต่อ:\n📧 poffog@gmail.com\n\nเราจะตอบกลับโดยเร็วที่สุดค่ะ! 💕",
    "รับทราบค่ะ! 🌸\n\nสำหรับคำถามเฉพาะทาง กรุณาติดต่อทีมงานโดยตรงที่ poffog@gmail.com นะคะ",
    "ขอบคุณค่ะ! 💕 ทีมงานจะติดต่อกลับทาง Email เร็วๆ นี้ค่ะ",
];

impl Topic {
    pub fn responses(self) -> &'static [&'static str] {
        match self {
            Topic::Greetings => GREETINGS,
            Topic::Services => SERVICES,
            Topic::Contact => CONTACT,
            Topic::Price => PRICE,
            Topic::About => ABOUT,
            Topic::Thanks => THANKS,
            Topic::Default => DEFAULT,
        }
    }
}

pub fn classify(message: &str) -> Topic {
    let lower = message.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|word| lower.contains(word)))
        .map(|(topic, _)| *topic)
        .unwrap_or(Topic::Default)
}

/// Picks one of the topic's responses uniformly.
pub fn pick<R: Rng + ?Sized>(topic: Topic, rng: &mut R) -> &'static str {
    topic.responses().choose(rng).copied().unwrap_or(DEFAULT[0])
}

pub fn reply<R: Rng + ?Sized>(message: &str, rng: &mut R) -> (Topic, &'static str) {
    let topic = classify(message);
    (topic, pick(topic, rng))
}
