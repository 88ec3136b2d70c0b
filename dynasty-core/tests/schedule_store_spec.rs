use speculate2::speculate;

speculate! {
    use dynasty_core::models::*;
    use dynasty_core::{Database, InvariantError, StoreError};

    fn setup_db() -> Database {
        let db = Database::open_memory().expect("Failed to create test database");
        db.migrate().expect("Failed to migrate test database");
        db
    }

    fn opponent(name: &str) -> Option<Opponent> {
        Some(Opponent {
            name: name.to_string(),
            logo: None,
            rank: None,
            record: None,
            is_rivalry: false,
        })
    }

    fn game(week: i32, location: Location, name: &str) -> Game {
        Game {
            week,
            location,
            opponent: opponent(name),
            is_bye_week: false,
            is_conference_game: false,
            score: None,
            went_to_overtime: false,
        }
    }

    fn bye(week: i32) -> Game {
        Game {
            week,
            location: Location::Home,
            opponent: None,
            is_bye_week: true,
            is_conference_game: false,
            score: None,
            went_to_overtime: false,
        }
    }

    fn create(db: &Database, playthrough_id: &str, year: i32, games: Vec<Game>) -> Schedule {
        db.create_schedule(CreateScheduleInput {
            playthrough_id: playthrough_id.to_string(),
            year,
            team_name: "Tigers".to_string(),
            games,
            metadata: None,
        })
        .expect("Failed to create schedule")
    }

    fn weeks(schedule: &Schedule) -> Vec<i32> {
        schedule.games.iter().map(|g| g.week).collect()
    }

    describe "creating schedules" {
        it "walks the bye-week then add-game example" {
            let db = setup_db();
            let created = create(&db, "P1", 2024, vec![bye(0)]);
            let stats = created.stats();
            assert_eq!(stats.counts.total_games, 0);
            assert_eq!(stats.counts.bye_weeks, 1);

            db.add_game("P1", 2024, game(1, Location::Away, "Rivals U")).unwrap();

            let stats = db.schedule_stats("P1", 2024).unwrap().unwrap();
            assert_eq!(stats.counts.total_games, 1);
            assert_eq!(stats.counts.away_games, 1);
        }

        it "stores games sorted by week" {
            let db = setup_db();
            create(&db, "P1", 2024, vec![
                game(9, Location::Home, "C"),
                game(2, Location::Away, "A"),
                bye(5),
            ]);

            let stored = db.get_schedule("P1", 2024).unwrap().unwrap();
            assert_eq!(weeks(&stored), vec![2, 5, 9]);
        }

        it "rejects an empty games list and stores nothing" {
            let db = setup_db();
            let result = db.create_schedule(CreateScheduleInput {
                playthrough_id: "P1".into(),
                year: 2024,
                team_name: "Tigers".into(),
                games: vec![],
                metadata: None,
            });

            assert!(matches!(result, Err(StoreError::Invariant(InvariantError::EmptyGames))));
            assert!(db.get_schedule("P1", 2024).unwrap().is_none());
        }

        it "rejects a second schedule for the same playthrough and year" {
            let db = setup_db();
            create(&db, "P1", 2024, vec![bye(0)]);
            let result = db.create_schedule(CreateScheduleInput {
                playthrough_id: "P1".into(),
                year: 2024,
                team_name: "Other".into(),
                games: vec![bye(1)],
                metadata: None,
            });

            assert!(matches!(result, Err(StoreError::Conflict(_))));
            let stored = db.get_schedule("P1", 2024).unwrap().unwrap();
            assert_eq!(stored.team_name, "Tigers");
        }

        it "allows the same playthrough in another year" {
            let db = setup_db();
            create(&db, "P1", 2024, vec![bye(0)]);
            create(&db, "P1", 2025, vec![bye(0)]);

            let years: Vec<_> = db.schedules_by_playthrough("P1").unwrap()
                .iter().map(|s| s.year).collect();
            assert_eq!(years, vec![2025, 2024]);
        }
    }

    describe "game operations" {
        it "rejects adding a game for a taken week and leaves the document unchanged" {
            let db = setup_db();
            create(&db, "P1", 2024, vec![game(1, Location::Home, "A")]);
            let before = db.get_schedule("P1", 2024).unwrap().unwrap();

            let result = db.add_game("P1", 2024, game(1, Location::Away, "B"));

            assert!(matches!(result, Err(StoreError::Conflict(_))));
            let after = db.get_schedule("P1", 2024).unwrap().unwrap();
            assert_eq!(after, before);
        }

        it "merges partial game updates" {
            let db = setup_db();
            create(&db, "P1", 2024, vec![game(1, Location::Home, "A")]);

            let updated = db.update_game("P1", 2024, 1, GameUpdate {
                score: Some(Some(Score { home: 35, away: 17 })),
                went_to_overtime: Some(false),
                ..Default::default()
            }).unwrap();

            let g = updated.game_by_week(1).unwrap();
            assert_eq!(g.opponent.as_ref().unwrap().name, "A");
            assert_eq!(updated.result_for_week(1), Some(GameResult::Win));
            assert_eq!(db.get_schedule("P1", 2024).unwrap().unwrap(), updated);
        }

        it "reports a missing week on update" {
            let db = setup_db();
            create(&db, "P1", 2024, vec![game(1, Location::Home, "A")]);

            let result = db.update_game("P1", 2024, 4, GameUpdate::default());
            assert!(matches!(result, Err(StoreError::NotFound(_))));
        }

        it "treats removing a missing week as a no-op" {
            let db = setup_db();
            let created = create(&db, "P1", 2024, vec![game(1, Location::Home, "A"), game(2, Location::Away, "B")]);
            std::thread::sleep(std::time::Duration::from_millis(5));

            let schedule = db.remove_game("P1", 2024, 7).unwrap();
            assert_eq!(weeks(&schedule), vec![1, 2]);
            assert_eq!(schedule.updated_at, created.updated_at);
            let stored = db.get_schedule("P1", 2024).unwrap().unwrap();
            assert_eq!(stored, created);
        }

        it "clears a score sent as null" {
            let db = setup_db();
            create(&db, "P1", 2024, vec![game(1, Location::Home, "A"), game(2, Location::Away, "B")]);
            db.update_game("P1", 2024, 1, GameUpdate {
                score: Some(Some(Score { home: 21, away: 7 })),
                ..Default::default()
            }).unwrap();

            let update: GameUpdate = serde_json::from_str(r#"{"score": null}"#).unwrap();
            let updated = db.update_game("P1", 2024, 1, update).unwrap();

            assert_eq!(updated.game_by_week(1).unwrap().score, None);
            assert_eq!(updated.result_for_week(1), None);
            assert_eq!(updated.record().wins, 0);
            let stored = db.get_schedule("P1", 2024).unwrap().unwrap();
            assert_eq!(stored.game_by_week(1).unwrap().score, None);
            assert_eq!(stored.game_by_week(1).unwrap().opponent.as_ref().unwrap().name, "A");
        }

        it "stores opponent names trimmed" {
            let db = setup_db();
            create(&db, "P1", 2024, vec![game(1, Location::Home, "  Rivals U ")]);
            let added = db.add_game("P1", 2024, game(2, Location::Away, " State ")).unwrap();

            assert_eq!(added.game_by_week(1).unwrap().opponent.as_ref().unwrap().name, "Rivals U");
            let stored = db.get_schedule("P1", 2024).unwrap().unwrap();
            assert_eq!(stored.game_by_week(2).unwrap().opponent.as_ref().unwrap().name, "State");
        }

        it "refuses to remove the last game" {
            let db = setup_db();
            create(&db, "P1", 2024, vec![game(1, Location::Home, "A"), game(2, Location::Away, "B")]);

            db.remove_game("P1", 2024, 1).unwrap();
            let result = db.remove_game("P1", 2024, 2);

            assert!(matches!(result, Err(StoreError::Invariant(InvariantError::EmptyGames))));
            let stored = db.get_schedule("P1", 2024).unwrap().unwrap();
            assert_eq!(weeks(&stored), vec![2]);
        }

        it "fails game operations on a missing schedule" {
            let db = setup_db();
            let result = db.add_game("nope", 2024, bye(0));
            assert!(matches!(result, Err(StoreError::NotFound(_))));
        }
    }

    describe "whole-document updates" {
        it "rejects duplicate weeks and keeps the previous state" {
            let db = setup_db();
            create(&db, "P1", 2024, vec![game(1, Location::Home, "A")]);

            let result = db.update_schedule("P1", 2024, UpdateScheduleInput {
                team_name: Some("Lions".into()),
                games: Some(vec![game(3, Location::Home, "X"), game(3, Location::Away, "Y")]),
                metadata: None,
            });

            assert!(matches!(result, Err(StoreError::Invariant(InvariantError::DuplicateWeek(3)))));
            let stored = db.get_schedule("P1", 2024).unwrap().unwrap();
            assert_eq!(stored.team_name, "Tigers");
            assert_eq!(weeks(&stored), vec![1]);
        }

        it "replaces games and keeps metadata when omitted" {
            let db = setup_db();
            let mut metadata = std::collections::BTreeMap::new();
            metadata.insert("difficulty".to_string(), "Heisman".to_string());
            db.create_schedule(CreateScheduleInput {
                playthrough_id: "P1".into(),
                year: 2024,
                team_name: "Tigers".into(),
                games: vec![bye(0)],
                metadata: Some(metadata.clone()),
            }).unwrap();

            let updated = db.update_schedule("P1", 2024, UpdateScheduleInput {
                games: Some(vec![game(4, Location::Home, "D"), game(1, Location::Away, "B")]),
                ..Default::default()
            }).unwrap();

            assert_eq!(weeks(&updated), vec![1, 4]);
            assert_eq!(updated.metadata, Some(metadata));
            assert!(updated.updated_at >= updated.created_at);

            let cleared: UpdateScheduleInput = serde_json::from_str(r#"{"metadata": null}"#).unwrap();
            db.update_schedule("P1", 2024, cleared).unwrap();
            let stored = db.get_schedule("P1", 2024).unwrap().unwrap();
            assert_eq!(stored.metadata, None);
            assert_eq!(weeks(&stored), vec![1, 4]);
        }
    }

    describe "listing and deleting" {
        it "filters by year and team" {
            let db = setup_db();
            create(&db, "P1", 2024, vec![bye(0)]);
            create(&db, "P2", 2024, vec![bye(0)]);
            create(&db, "P2", 2025, vec![bye(0)]);

            assert_eq!(db.schedules_by_year(2024).unwrap().len(), 2);
            assert_eq!(db.schedules_by_team("Tigers").unwrap().len(), 3);
            assert_eq!(db.schedules_by_team("Lions").unwrap().len(), 0);
            assert_eq!(db.list_schedules().unwrap().len(), 3);
        }

        it "deletes a schedule once" {
            let db = setup_db();
            create(&db, "P1", 2024, vec![bye(0)]);

            assert!(db.delete_schedule("P1", 2024).unwrap());
            assert!(!db.delete_schedule("P1", 2024).unwrap());
            assert!(db.get_schedule("P1", 2024).unwrap().is_none());
        }
    }

    describe "exporting schedules" {
        it "creates then replaces the season" {
            let db = setup_db();
            let first = db.export_schedule("P1", 2024, "Tigers", vec![bye(0)]).unwrap();
            let second = db.export_schedule("P1", 2024, "Bengals", vec![
                game(2, Location::Home, "B"),
                game(1, Location::Away, "A"),
            ]).unwrap();

            assert_eq!(first.id, second.id);
            assert_eq!(second.team_name, "Bengals");
            assert_eq!(weeks(&second), vec![1, 2]);
            assert_eq!(db.list_schedules().unwrap().len(), 1);
        }
    }
}
