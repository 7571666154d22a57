//! Starter content: the basic kana table and a small vocabulary list.
//!
//! Inserts use `INSERT OR IGNORE`, so seeding an already populated store is a
//! no-op.

use sqlx::SqlitePool;

use crate::db::DatabaseProxy;

struct KanaSeed {
    consonant: &'static str,
    vowel: &'static str,
    hiragana: &'static str,
    katakana: &'static str,
    reading_en: &'static str,
    reading_ru: &'static str,
}

const fn kana(
    consonant: &'static str,
    vowel: &'static str,
    hiragana: &'static str,
    katakana: &'static str,
    reading_en: &'static str,
    reading_ru: &'static str,
) -> KanaSeed {
    KanaSeed {
        consonant,
        vowel,
        hiragana,
        katakana,
        reading_en,
        reading_ru,
    }
}

const KANA: &[KanaSeed] = &[
    kana("", "a", "あ", "ア", "a", "а"),
    kana("", "i", "い", "イ", "i", "и"),
    kana("", "u", "う", "ウ", "u", "у"),
    kana("", "e", "え", "エ", "e", "э"),
    kana("", "o", "お", "オ", "o", "о"),
    kana("k", "a", "か", "カ", "ka", "ка"),
    kana("k", "i", "き", "キ", "ki", "ки"),
    kana("k", "u", "く", "ク", "ku", "ку"),
    kana("k", "e", "け", "ケ", "ke", "кэ"),
    kana("k", "o", "こ", "コ", "ko", "ко"),
    kana("s", "a", "さ", "サ", "sa", "са"),
    kana("s", "i", "し", "シ", "shi", "си"),
    kana("s", "u", "す", "ス", "su", "су"),
    kana("s", "e", "せ", "セ", "se", "сэ"),
    kana("s", "o", "そ", "ソ", "so", "со"),
    kana("t", "a", "た", "タ", "ta", "та"),
    kana("t", "i", "ち", "チ", "chi", "ти"),
    kana("t", "u", "つ", "ツ", "tsu", "цу"),
    kana("t", "e", "て", "テ", "te", "тэ"),
    kana("t", "o", "と", "ト", "to", "то"),
    kana("n", "a", "な", "ナ", "na", "на"),
    kana("n", "i", "に", "ニ", "ni", "ни"),
    kana("n", "u", "ぬ", "ヌ", "nu", "ну"),
    kana("n", "e", "ね", "ネ", "ne", "нэ"),
    kana("n", "o", "の", "ノ", "no", "но"),
    kana("h", "a", "は", "ハ", "ha", "ха"),
    kana("h", "i", "ひ", "ヒ", "hi", "хи"),
    kana("h", "u", "ふ", "フ", "fu", "фу"),
    kana("h", "e", "へ", "ヘ", "he", "хэ"),
    kana("h", "o", "ほ", "ホ", "ho", "хо"),
    kana("m", "a", "ま", "マ", "ma", "ма"),
    kana("m", "i", "み", "ミ", "mi", "ми"),
    kana("m", "u", "む", "ム", "mu", "му"),
    kana("m", "e", "め", "メ", "me", "мэ"),
    kana("m", "o", "も", "モ", "mo", "мо"),
    kana("y", "a", "や", "ヤ", "ya", "я"),
    kana("y", "u", "ゆ", "ユ", "yu", "ю"),
    kana("y", "o", "よ", "ヨ", "yo", "ё"),
    kana("r", "a", "ら", "ラ", "ra", "ра"),
    kana("r", "i", "り", "リ", "ri", "ри"),
    kana("r", "u", "る", "ル", "ru", "ру"),
    kana("r", "e", "れ", "レ", "re", "рэ"),
    kana("r", "o", "ろ", "ロ", "ro", "ро"),
    kana("w", "a", "わ", "ワ", "wa", "ва"),
    kana("w", "o", "を", "ヲ", "wo", "о"),
    kana("n", "", "ん", "ン", "n", "н"),
];

struct WordSeed {
    text: &'static str,
    phonetic: &'static str,
    translations: [&'static str; 3],
    example: &'static str,
    example_translations: [&'static str; 3],
    periods: [i64; 4],
}

const WORDS: &[WordSeed] = &[
    WordSeed {
        text: "水",
        phonetic: "みず",
        translations: ["water", "вода", "Wasser"],
        example: "水を飲みます。",
        example_translations: ["I drink water.", "Я пью воду.", "Ich trinke Wasser."],
        periods: [14, 7, 3, 1],
    },
    WordSeed {
        text: "猫",
        phonetic: "ねこ",
        translations: ["cat", "кошка", "Katze"],
        example: "猫が好きです。",
        example_translations: ["I like cats.", "Я люблю кошек.", "Ich mag Katzen."],
        periods: [14, 7, 3, 1],
    },
    WordSeed {
        text: "本",
        phonetic: "ほん",
        translations: ["book", "книга", "Buch"],
        example: "本を読みます。",
        example_translations: ["I read a book.", "Я читаю книгу.", "Ich lese ein Buch."],
        periods: [14, 7, 3, 1],
    },
    WordSeed {
        text: "山",
        phonetic: "やま",
        translations: ["mountain", "гора", "Berg"],
        example: "山に登ります。",
        example_translations: [
            "I climb a mountain.",
            "Я поднимаюсь на гору.",
            "Ich besteige einen Berg.",
        ],
        periods: [14, 7, 3, 1],
    },
    WordSeed {
        text: "友達",
        phonetic: "ともだち",
        translations: ["friend", "друг", "Freund"],
        example: "友達と話します。",
        example_translations: [
            "I talk with a friend.",
            "Я разговариваю с другом.",
            "Ich spreche mit einem Freund.",
        ],
        periods: [10, 5, 2, 1],
    },
    WordSeed {
        text: "学校",
        phonetic: "がっこう",
        translations: ["school", "школа", "Schule"],
        example: "学校に行きます。",
        example_translations: ["I go to school.", "Я иду в школу.", "Ich gehe zur Schule."],
        periods: [10, 5, 2, 1],
    },
    WordSeed {
        text: "食べる",
        phonetic: "たべる",
        translations: ["to eat", "есть", "essen"],
        example: "パンを食べる。",
        example_translations: ["I eat bread.", "Я ем хлеб.", "Ich esse Brot."],
        periods: [10, 5, 2, 1],
    },
    WordSeed {
        text: "新しい",
        phonetic: "あたらしい",
        translations: ["new", "новый", "neu"],
        example: "新しい車です。",
        example_translations: [
            "It is a new car.",
            "Это новая машина.",
            "Das ist ein neues Auto.",
        ],
        periods: [10, 5, 2, 1],
    },
    WordSeed {
        text: "駅",
        phonetic: "えき",
        translations: ["station", "станция", "Bahnhof"],
        example: "駅はどこですか。",
        example_translations: ["Where is the station?", "Где станция?", "Wo ist der Bahnhof?"],
        periods: [21, 9, 4, 2],
    },
    WordSeed {
        text: "雨",
        phonetic: "あめ",
        translations: ["rain", "дождь", "Regen"],
        example: "今日は雨です。",
        example_translations: [
            "It is raining today.",
            "Сегодня идёт дождь.",
            "Heute regnet es.",
        ],
        periods: [21, 9, 4, 2],
    },
    WordSeed {
        text: "花",
        phonetic: "はな",
        translations: ["flower", "цветок", "Blume"],
        example: "花がきれいです。",
        example_translations: [
            "The flowers are beautiful.",
            "Цветы красивые.",
            "Die Blumen sind schön.",
        ],
        periods: [21, 9, 4, 2],
    },
    WordSeed {
        text: "時間",
        phonetic: "じかん",
        translations: ["time", "время", "Zeit"],
        example: "時間がありません。",
        example_translations: [
            "I have no time.",
            "У меня нет времени.",
            "Ich habe keine Zeit.",
        ],
        periods: [30, 12, 5, 2],
    },
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub characters: u64,
    pub words: u64,
}

pub fn kana_count() -> usize {
    KANA.len()
}

pub fn word_count() -> usize {
    WORDS.len()
}

pub async fn seed_content(proxy: &DatabaseProxy) -> Result<SeedReport, sqlx::Error> {
    let report = SeedReport {
        characters: seed_characters(proxy.pool()).await?,
        words: seed_words(proxy.pool()).await?,
    };

    if report.characters > 0 || report.words > 0 {
        tracing::info!(
            characters = report.characters,
            words = report.words,
            "seeded starter content"
        );
    } else {
        tracing::debug!("starter content already present");
    }
    Ok(report)
}

async fn seed_characters(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0;
    for (index, kana) in KANA.iter().enumerate() {
        let audio = format!("audio/kana/{}.mp3", kana.reading_en);
        inserted += sqlx::query(
            r#"
            INSERT OR IGNORE INTO "characters"
              ("id","consonant","vowel","hiragana","katakana","readingEn","readingRu","audio")
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(index as i64 + 1)
        .bind(kana.consonant)
        .bind(kana.vowel)
        .bind(kana.hiragana)
        .bind(kana.katakana)
        .bind(kana.reading_en)
        .bind(kana.reading_ru)
        .bind(audio)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }
    tx.commit().await?;
    Ok(inserted)
}

async fn seed_words(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0;
    for (index, word) in WORDS.iter().enumerate() {
        let [en, ru, de] = word.translations;
        let [example_en, example_ru, example_de] = word.example_translations;
        let [easy, normal, hard, extra_hard] = word.periods;
        inserted += sqlx::query(
            r#"
            INSERT OR IGNORE INTO "words"
              ("id","text","phonetic","translationEn","translationRu","translationDe",
               "example","exampleEn","exampleRu","exampleDe",
               "periodEasy","periodNormal","periodHard","periodExtraHard")
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(index as i64 + 1)
        .bind(word.text)
        .bind(word.phonetic)
        .bind(en)
        .bind(ru)
        .bind(de)
        .bind(word.example)
        .bind(example_en)
        .bind(example_ru)
        .bind(example_de)
        .bind(easy)
        .bind(normal)
        .bind(hard)
        .bind(extra_hard)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }
    tx.commit().await?;
    Ok(inserted)
}
